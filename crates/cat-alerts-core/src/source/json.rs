use super::BatchSource;
use crate::error::AlertsError;
use crate::model::RawAccidentRecord;
use std::path::PathBuf;

/// Reads a batch exported as a JSON array of flat records.
pub struct JsonBatchSource {
    path: PathBuf,
    name: String,
}

impl JsonBatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl BatchSource for JsonBatchSource {
    fn load(&self) -> Result<Vec<RawAccidentRecord>, AlertsError> {
        let bytes = std::fs::read(&self.path)?;
        parse_json_batch(&bytes).map_err(|e| AlertsError::BatchLoad {
            source_name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Parse a JSON array of records.
pub fn parse_json_batch(bytes: &[u8]) -> Result<Vec<RawAccidentRecord>, AlertsError> {
    Ok(serde_json::from_slice(bytes)?)
}
