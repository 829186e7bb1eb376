pub mod classify;
pub mod error;
pub mod filter;
pub mod identifiers;
pub mod model;
pub mod normalize;
pub mod receipts;
pub mod rules;
pub mod source;

use classify::consequence::ConsequenceClassifier;
use error::AlertsError;
use model::{AccidentRecord, RawAccidentRecord, RejectedRecord};
use rayon::prelude::*;
use rules::compile::CompiledRuleTables;
use serde::{Deserialize, Serialize};
use source::BatchSource;

/// Enriched records of one batch, plus the rows that were set aside.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub records: Vec<AccidentRecord>,
    pub rejected: Vec<RejectedRecord>,
}

/// Main API entry point: enrich and classify one batch of raw records.
///
/// Records are normalized, linked to their root receipt and collapsed to the
/// latest receipt of each chain before being classified in parallel. Bad
/// rows never abort the batch; they come back in `rejected`.
pub fn enrich_batch(
    raw: Vec<RawAccidentRecord>,
    tables: &CompiledRuleTables,
    classifier: &ConsequenceClassifier,
) -> EnrichmentResult {
    let received = raw.len();

    // Chains are indexed before normalization so a rejected row still links
    // its successors to their root.
    let mut resolver = receipts::RootResolver::from_raw(&raw);
    let (records, mut rejected) = normalize::normalize_batch(raw);
    let (records, cyclic) = receipts::resolve_roots_with(&mut resolver, records);
    rejected.extend(cyclic);

    let mut records = receipts::collapse_to_latest(records);

    records.par_iter_mut().for_each(|record| {
        classify::risk_factor::annotate(record, tables);
        classifier.annotate(record);
        identifiers::annotate(record);
    });

    tracing::info!(
        received,
        enriched = records.len(),
        rejected = rejected.len(),
        "batch enriched"
    );

    EnrichmentResult { records, rejected }
}

/// Load a batch from `source` and enrich it.
pub fn enrich_from_source(
    source: &dyn BatchSource,
    tables: &CompiledRuleTables,
    classifier: &ConsequenceClassifier,
) -> Result<EnrichmentResult, AlertsError> {
    let raw = source.load()?;
    tracing::info!(source = source.source_name(), rows = raw.len(), "batch loaded");
    Ok(enrich_batch(raw, tables, classifier))
}
