use crate::classify::outcome::RiskFactorAssignment;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A flat accident record as delivered by a batch source.
///
/// Every field is optional text; numeric cells are stringified on the way in.
/// Column names used by the CAT extract are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccidentRecord {
    #[serde(default, alias = "meta_nr_recibo", deserialize_with = "text")]
    pub receipt_id: Option<String>,
    #[serde(default, alias = "nrRecCatOrig", deserialize_with = "text")]
    pub previous_receipt_id: Option<String>,
    #[serde(default, alias = "codsitgeradora", deserialize_with = "text")]
    pub generating_situation: Option<String>,
    #[serde(default, alias = "codagntcausador", deserialize_with = "text")]
    pub causative_agent: Option<String>,
    #[serde(default, alias = "dsclesao", deserialize_with = "text")]
    pub injury_description: Option<String>,
    #[serde(default, alias = "codcid", deserialize_with = "text")]
    pub diagnosis_code: Option<String>,
    #[serde(default, alias = "codparteating", deserialize_with = "text")]
    pub body_part: Option<String>,
    #[serde(default, alias = "indcatobito", deserialize_with = "text")]
    pub death_indicator: Option<String>,
    #[serde(default, alias = "indinternacao", deserialize_with = "text")]
    pub hospitalization_indicator: Option<String>,
    #[serde(default, alias = "durtrat", deserialize_with = "text")]
    pub treatment_days: Option<String>,
    #[serde(default, alias = "tpinsc", deserialize_with = "text")]
    pub tax_id_type: Option<String>,
    #[serde(default, alias = "nrinsc", deserialize_with = "text")]
    pub tax_id: Option<String>,
    #[serde(default, alias = "sguf_local_acidente", deserialize_with = "text")]
    pub state: Option<String>,
    #[serde(default, alias = "uorg_local_acidente", deserialize_with = "text")]
    pub regional_unit: Option<String>,
    #[serde(default, alias = "tpacid", deserialize_with = "text")]
    pub accident_type: Option<String>,
    #[serde(default, alias = "cnae_local_acidente", deserialize_with = "text")]
    pub activity_code: Option<String>,
    #[serde(default, alias = "secao_cnae_local_acidente", deserialize_with = "text")]
    pub activity_section: Option<String>,
    #[serde(default, alias = "codcbo", deserialize_with = "text")]
    pub occupation_code: Option<String>,
}

/// Accept strings, integers, floats and booleans as text. Integral floats lose
/// their fractional part so spreadsheet cells like `40.0` read as `40`.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(serde_json::Value::Number(n)) => Some(number_text(&n)),
        Some(other) => Some(other.to_string()),
    })
}

/// Largest magnitude below which every integer is exactly representable as f64.
pub(crate) const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Integers keep their digits; integral floats within the exact range drop
/// the fraction. Anything else is kept as serde_json renders it, never cast.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_u64() || n.is_i64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Extract column names and the record field each one fills.
pub const FIELD_ALIASES: &[(&str, &str)] = &[
    ("meta_nr_recibo", "receipt_id"),
    ("nrRecCatOrig", "previous_receipt_id"),
    ("codsitgeradora", "generating_situation"),
    ("codagntcausador", "causative_agent"),
    ("dsclesao", "injury_description"),
    ("codcid", "diagnosis_code"),
    ("codparteating", "body_part"),
    ("indcatobito", "death_indicator"),
    ("indinternacao", "hospitalization_indicator"),
    ("durtrat", "treatment_days"),
    ("tpinsc", "tax_id_type"),
    ("nrinsc", "tax_id"),
    ("sguf_local_acidente", "state"),
    ("uorg_local_acidente", "regional_unit"),
    ("tpacid", "accident_type"),
    ("cnae_local_acidente", "activity_code"),
    ("secao_cnae_local_acidente", "activity_section"),
    ("codcbo", "occupation_code"),
];

impl RawAccidentRecord {
    /// Record field name for a column, resolving extract aliases.
    pub fn canonical_field(column: &str) -> &str {
        FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == column)
            .map(|(_, field)| *field)
            .unwrap_or(column)
    }
}

/// Registration scheme of the employer's tax identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxIdType {
    /// Company registry (14 digits, or the 8-digit root).
    Cnpj,
    /// Individual taxpayer (11 digits).
    Cpf,
    /// Individual employer economic activity registry (14 digits).
    Caepf,
    /// National works registry (12 digits).
    Cno,
}

impl TaxIdType {
    /// Decode the numeric discriminant used by the extract ("1".."4").
    pub fn from_discriminant(s: &str) -> Option<TaxIdType> {
        match s.trim() {
            "1" => Some(TaxIdType::Cnpj),
            "2" => Some(TaxIdType::Cpf),
            "3" => Some(TaxIdType::Caepf),
            "4" => Some(TaxIdType::Cno),
            _ => None,
        }
    }
}

impl fmt::Display for TaxIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxIdType::Cnpj => write!(f, "CNPJ"),
            TaxIdType::Cpf => write!(f, "CPF"),
            TaxIdType::Caepf => write!(f, "CAEPF"),
            TaxIdType::Cno => write!(f, "CNO"),
        }
    }
}

/// Kind of event a CAT reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentType {
    Typical,
    OccupationalDisease,
    Commute,
}

impl AccidentType {
    pub fn from_discriminant(s: &str) -> Option<AccidentType> {
        match s.trim() {
            "1" => Some(AccidentType::Typical),
            "2" => Some(AccidentType::OccupationalDisease),
            "3" => Some(AccidentType::Commute),
            _ => None,
        }
    }
}

/// A normalized accident record, annotated in place by the pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccidentRecord {
    pub receipt_id: String,
    pub previous_receipt_id: Option<String>,
    pub generating_situation: Option<String>,
    pub causative_agent: Option<String>,
    pub injury_description: Option<String>,
    pub diagnosis_code: Option<String>,
    /// First three characters of the diagnosis code.
    pub diagnosis_category: Option<String>,
    pub body_part: Option<String>,
    pub death: bool,
    pub hospitalization: bool,
    pub treatment_days: u32,
    pub tax_id_type: Option<TaxIdType>,
    pub tax_id: Option<String>,
    pub state: Option<String>,
    pub regional_unit: Option<String>,
    pub accident_type: Option<AccidentType>,
    pub activity_code: Option<String>,
    pub activity_section: Option<String>,
    pub occupation_code: Option<String>,

    // Derived by the pipeline.
    #[serde(default)]
    pub root_receipt_id: Option<String>,
    #[serde(default)]
    pub risk_factors: RiskFactorAssignment,
    #[serde(default)]
    pub risk_factor_codes: Vec<String>,
    #[serde(default)]
    pub consequence_labels: Vec<String>,
    #[serde(default)]
    pub formatted_tax_id: Option<String>,
    #[serde(default)]
    pub formatted_activity_code: Option<String>,
    #[serde(default)]
    pub formatted_occupation_code: Option<String>,
}

impl AccidentRecord {
    /// Minimal record carrying only its receipt chain link.
    pub fn new(receipt_id: impl Into<String>, previous_receipt_id: Option<&str>) -> Self {
        Self {
            receipt_id: receipt_id.into(),
            previous_receipt_id: previous_receipt_id.map(str::to_string),
            ..Default::default()
        }
    }

    /// Root receipt if resolved, otherwise the record's own receipt.
    pub fn root_or_self(&self) -> &str {
        self.root_receipt_id.as_deref().unwrap_or(&self.receipt_id)
    }
}

/// A record dropped from the batch, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub receipt_id: Option<String>,
    pub reason: String,
}
