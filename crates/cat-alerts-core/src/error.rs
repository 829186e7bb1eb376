use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AlertsError {
    #[error("rule conflict in table '{table}': value '{value}' is claimed by risk factors {existing} and {incoming}")]
    RuleConflict {
        table: String,
        value: String,
        existing: String,
        incoming: String,
    },

    #[error("range bounds '{start}' and '{end}' must have the same length")]
    RangeLengthMismatch { start: String, end: String },

    #[error("malformed range '{start}-{end}': {reason}")]
    MalformedRange {
        start: String,
        end: String,
        reason: String,
    },

    #[error("failed to load ruleset from {path}: {reason}")]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("invalid ruleset: {0}")]
    RulesetInvalid(String),

    #[error("receipt chain cycles back on itself: {}", chain.join(" -> "))]
    ReceiptCycle { chain: Vec<String> },

    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("failed to load batch from {source_name}: {reason}")]
    BatchLoad { source_name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
