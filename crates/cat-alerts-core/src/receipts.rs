//! Root-receipt resolution for amendment and reopening chains.
//!
//! A CAT that reopens or amends an earlier one points at it through its
//! previous-receipt id. The root of a chain is the first receipt that has no
//! previous receipt, points at itself, or points outside the batch (in which
//! case the dangling id is the root).

use crate::error::AlertsError;
use crate::model::{AccidentRecord, RawAccidentRecord, RejectedRecord};
use crate::normalize::clean;
use std::collections::{HashMap, HashSet};

/// Back-reference index over one batch, with memoized roots.
#[derive(Debug, Default)]
pub struct RootResolver {
    previous: HashMap<String, Option<String>>,
    memo: HashMap<String, String>,
}

impl RootResolver {
    /// Index the receipt links of a batch. On duplicate receipt ids the last one wins.
    pub fn new<'a>(records: impl IntoIterator<Item = &'a AccidentRecord>) -> Self {
        Self::from_links(
            records
                .into_iter()
                .map(|r| (r.receipt_id.clone(), r.previous_receipt_id.clone())),
        )
    }

    /// Index the links of raw rows, before any row is rejected for its other
    /// fields. Rows without a receipt id carry no link.
    pub fn from_raw<'a>(rows: impl IntoIterator<Item = &'a RawAccidentRecord>) -> Self {
        Self::from_links(rows.into_iter().filter_map(|row| {
            let receipt_id = clean(row.receipt_id.clone())?;
            Some((receipt_id, clean(row.previous_receipt_id.clone())))
        }))
    }

    pub fn from_links(links: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
        let mut previous = HashMap::new();
        for (receipt_id, previous_receipt_id) in links {
            if previous.contains_key(&receipt_id) {
                tracing::warn!(receipt = %receipt_id, "duplicate receipt id in batch");
            }
            previous.insert(receipt_id, previous_receipt_id);
        }
        Self {
            previous,
            memo: HashMap::new(),
        }
    }

    /// Resolve the root receipt of `receipt_id`.
    ///
    /// Walks the chain iteratively; every receipt on the walked path is cached.
    /// A receipt unknown to the batch is its own root.
    pub fn resolve(&mut self, receipt_id: &str) -> Result<String, AlertsError> {
        if let Some(root) = self.memo.get(receipt_id) {
            return Ok(root.clone());
        }

        let mut path: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = receipt_id;

        let root = loop {
            if let Some(root) = self.memo.get(current) {
                break root.clone();
            }
            if !seen.insert(current) {
                let mut chain = path;
                chain.push(current.to_string());
                return Err(AlertsError::ReceiptCycle { chain });
            }
            path.push(current.to_string());

            match self.previous.get(current) {
                None | Some(None) => break current.to_string(),
                Some(Some(prev)) if prev == current => break current.to_string(),
                Some(Some(prev)) if !self.previous.contains_key(prev) => break prev.clone(),
                Some(Some(prev)) => current = prev.as_str(),
            }
        };

        for receipt in path {
            self.memo.insert(receipt, root.clone());
        }
        Ok(root)
    }
}

/// Annotate every record with its root receipt, indexing the links of the
/// records themselves.
pub fn resolve_roots(records: Vec<AccidentRecord>) -> (Vec<AccidentRecord>, Vec<RejectedRecord>) {
    let mut resolver = RootResolver::new(&records);
    resolve_roots_with(&mut resolver, records)
}

/// Annotate every record with its root receipt using a prebuilt index.
///
/// The index may know receipts that are absent from `records`, such as rows
/// rejected during normalization; chains still run through them. Records
/// caught in a reference cycle cannot be rooted; they are returned as
/// rejections instead of aborting the batch.
pub fn resolve_roots_with(
    resolver: &mut RootResolver,
    records: Vec<AccidentRecord>,
) -> (Vec<AccidentRecord>, Vec<RejectedRecord>) {
    let mut resolved = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for mut record in records {
        match resolver.resolve(&record.receipt_id) {
            Ok(root) => {
                record.root_receipt_id = Some(root);
                resolved.push(record);
            }
            Err(e) => {
                tracing::warn!(receipt = %record.receipt_id, error = %e, "record rejected");
                rejected.push(RejectedRecord {
                    receipt_id: Some(record.receipt_id),
                    reason: e.to_string(),
                });
            }
        }
    }

    (resolved, rejected)
}

/// Keep only the latest receipt of every chain, ordered by ascending receipt id.
///
/// Records without a resolved root are grouped under their own receipt.
pub fn collapse_to_latest(records: Vec<AccidentRecord>) -> Vec<AccidentRecord> {
    let mut latest: HashMap<String, AccidentRecord> = HashMap::new();

    for record in records {
        let root = record.root_or_self().to_string();
        match latest.get(&root) {
            Some(kept) if kept.receipt_id >= record.receipt_id => {}
            _ => {
                latest.insert(root, record);
            }
        }
    }

    let mut survivors: Vec<AccidentRecord> = latest.into_values().collect();
    survivors.sort_by(|a, b| a.receipt_id.cmp(&b.receipt_id));
    survivors
}
