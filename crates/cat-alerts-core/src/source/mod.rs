pub mod json;
pub mod xlsx;

use crate::error::AlertsError;
use crate::model::RawAccidentRecord;

/// Trait for batch extraction backends.
pub trait BatchSource: Send + Sync {
    /// Load every raw record of the batch.
    fn load(&self) -> Result<Vec<RawAccidentRecord>, AlertsError>;

    /// Name of this source (for diagnostics).
    fn source_name(&self) -> &str;
}
