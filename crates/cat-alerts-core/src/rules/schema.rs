use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rule set mapping raw record codes to risk-factor codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactorRuleSet {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Map of risk-factor code -> matching raw values per field.
    pub factors: BTreeMap<String, RiskFactorRuleDef>,
}

/// The raw values that classify a record under one risk factor.
///
/// Entries in the diagnosis fields may be ICD-10 ranges such as `"S620-S629"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskFactorRuleDef {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "codsitgeradora")]
    pub generating_situation: Vec<String>,
    #[serde(default, alias = "codagntcausador")]
    pub causative_agent: Vec<String>,
    #[serde(default, alias = "dsclesao")]
    pub injury_description: Vec<String>,
    #[serde(default, alias = "codcid")]
    pub diagnosis_code: Vec<String>,
    #[serde(default, alias = "codcidCategoria")]
    pub diagnosis_category: Vec<String>,
    /// Diagnosis codes whose category match must not count on its own.
    #[serde(default, alias = "codcid_not")]
    pub diagnosis_category_exclusion: Vec<String>,
}

/// A field of the rule definition, in compile order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleField {
    GeneratingSituation,
    CausativeAgent,
    InjuryDescription,
    DiagnosisCode,
    DiagnosisCategory,
    DiagnosisCategoryExclusion,
}

impl RuleField {
    pub const ALL: [RuleField; 6] = [
        RuleField::GeneratingSituation,
        RuleField::CausativeAgent,
        RuleField::InjuryDescription,
        RuleField::DiagnosisCode,
        RuleField::DiagnosisCategory,
        RuleField::DiagnosisCategoryExclusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleField::GeneratingSituation => "generating_situation",
            RuleField::CausativeAgent => "causative_agent",
            RuleField::InjuryDescription => "injury_description",
            RuleField::DiagnosisCode => "diagnosis_code",
            RuleField::DiagnosisCategory => "diagnosis_category",
            RuleField::DiagnosisCategoryExclusion => "diagnosis_category_exclusion",
        }
    }

    /// Whether entries of this field may be written as code ranges.
    pub fn accepts_ranges(self) -> bool {
        matches!(
            self,
            RuleField::DiagnosisCode
                | RuleField::DiagnosisCategory
                | RuleField::DiagnosisCategoryExclusion
        )
    }
}

impl RiskFactorRuleDef {
    pub fn entries(&self, field: RuleField) -> &[String] {
        match field {
            RuleField::GeneratingSituation => &self.generating_situation,
            RuleField::CausativeAgent => &self.causative_agent,
            RuleField::InjuryDescription => &self.injury_description,
            RuleField::DiagnosisCode => &self.diagnosis_code,
            RuleField::DiagnosisCategory => &self.diagnosis_category,
            RuleField::DiagnosisCategoryExclusion => &self.diagnosis_category_exclusion,
        }
    }
}
