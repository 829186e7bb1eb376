use cat_alerts_core::error::AlertsError;
use cat_alerts_core::EnrichmentResult;

pub fn print(result: &EnrichmentResult) -> Result<(), AlertsError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
