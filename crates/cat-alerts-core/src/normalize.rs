use crate::error::AlertsError;
use crate::model::{AccidentRecord, AccidentType, RawAccidentRecord, RejectedRecord, TaxIdType};

/// Trim a text field; blank values count as absent.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn flag(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some(v) if v.eq_ignore_ascii_case("S"))
}

/// Convert a raw extract row into a typed record.
///
/// Fails on a missing receipt id or a non-numeric treatment duration.
/// Unknown discriminants are dropped with a warning.
pub fn normalize_record(raw: RawAccidentRecord) -> Result<AccidentRecord, AlertsError> {
    let receipt_id = clean(raw.receipt_id).ok_or(AlertsError::MissingField("receipt_id"))?;

    let treatment_days = match clean(raw.treatment_days) {
        None => 0,
        Some(text) => text.parse::<u32>().map_err(|_| AlertsError::InvalidField {
            field: "treatment_days",
            value: text.clone(),
        })?,
    };

    let tax_id_type = clean(raw.tax_id_type).and_then(|code| {
        let kind = TaxIdType::from_discriminant(&code);
        if kind.is_none() {
            tracing::warn!(receipt = %receipt_id, value = %code, "unknown tax id type");
        }
        kind
    });

    let accident_type = clean(raw.accident_type).and_then(|code| {
        let kind = AccidentType::from_discriminant(&code);
        if kind.is_none() {
            tracing::warn!(receipt = %receipt_id, value = %code, "unknown accident type");
        }
        kind
    });

    let diagnosis_code = clean(raw.diagnosis_code).map(|code| code.to_uppercase());
    let diagnosis_category = diagnosis_code
        .as_deref()
        .map(|code| code.chars().take(3).collect::<String>());

    Ok(AccidentRecord {
        receipt_id,
        previous_receipt_id: clean(raw.previous_receipt_id),
        generating_situation: clean(raw.generating_situation),
        causative_agent: clean(raw.causative_agent),
        injury_description: clean(raw.injury_description),
        diagnosis_code,
        diagnosis_category,
        body_part: clean(raw.body_part),
        death: flag(&raw.death_indicator),
        hospitalization: flag(&raw.hospitalization_indicator),
        treatment_days,
        tax_id_type,
        tax_id: clean(raw.tax_id),
        state: clean(raw.state).map(|s| s.to_uppercase()),
        regional_unit: clean(raw.regional_unit),
        accident_type,
        activity_code: clean(raw.activity_code),
        activity_section: clean(raw.activity_section).map(|s| s.to_uppercase()),
        occupation_code: clean(raw.occupation_code),
        ..Default::default()
    })
}

/// Normalize a whole batch, setting aside rows that cannot be used.
pub fn normalize_batch(raw: Vec<RawAccidentRecord>) -> (Vec<AccidentRecord>, Vec<RejectedRecord>) {
    let mut records = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for row in raw {
        let receipt_id = clean(row.receipt_id.clone());
        match normalize_record(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(receipt = ?receipt_id, error = %e, "record rejected");
                rejected.push(RejectedRecord {
                    receipt_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    (records, rejected)
}
