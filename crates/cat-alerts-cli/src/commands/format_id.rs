use cat_alerts_core::error::AlertsError;
use cat_alerts_core::model::TaxIdType;

/// Accepts the scheme name or the extract's numeric discriminant.
fn parse_id_type(value: &str) -> Option<TaxIdType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cnpj" => Some(TaxIdType::Cnpj),
        "cpf" => Some(TaxIdType::Cpf),
        "caepf" => Some(TaxIdType::Caepf),
        "cno" => Some(TaxIdType::Cno),
        other => TaxIdType::from_discriminant(other),
    }
}

pub fn run(id_type: &str, digits: &str) -> Result<(), AlertsError> {
    let kind = parse_id_type(id_type).ok_or_else(|| AlertsError::InvalidField {
        field: "id_type",
        value: id_type.to_string(),
    })?;

    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AlertsError::InvalidField {
            field: "digits",
            value: digits.to_string(),
        });
    }

    println!("{}", kind.format(digits));
    Ok(())
}
