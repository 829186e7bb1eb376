use crate::model::{AccidentRecord, AccidentType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What one subscriber wants to be alerted about.
///
/// Absent criteria match every record. List criteria match when the record
/// shares at least one value with the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberPreferences {
    pub email: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub regional_unit: Option<String>,
    /// Empty means every accident type.
    #[serde(default)]
    pub accident_types: Vec<AccidentType>,
    #[serde(default)]
    pub consequences: Option<Vec<String>>,
    #[serde(default)]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default)]
    pub activity_sections: Option<Vec<String>>,
}

impl SubscriberPreferences {
    pub fn matches(&self, record: &AccidentRecord) -> bool {
        if let Some(state) = &self.state {
            if !same_text(record.state.as_deref(), state) {
                return false;
            }
        }
        if let Some(unit) = &self.regional_unit {
            if !same_text(record.regional_unit.as_deref(), unit) {
                return false;
            }
        }
        if !self.accident_types.is_empty() {
            match record.accident_type {
                Some(kind) if self.accident_types.contains(&kind) => {}
                _ => return false,
            }
        }
        if let Some(labels) = &self.consequences {
            if !intersects(labels, &record.consequence_labels) {
                return false;
            }
        }
        if let Some(codes) = &self.risk_factors {
            if !intersects(codes, &record.risk_factor_codes) {
                return false;
            }
        }
        if let Some(sections) = &self.activity_sections {
            match record.activity_section.as_deref() {
                Some(section) if sections.iter().any(|s| s.eq_ignore_ascii_case(section)) => {}
                _ => return false,
            }
        }
        true
    }
}

fn same_text(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case(wanted.trim()))
}

fn intersects(wanted: &[String], present: &[String]) -> bool {
    wanted.iter().any(|w| present.contains(w))
}

/// Select the records a subscriber should be alerted about, skipping receipts
/// already sent to them.
pub fn filter_for_subscriber<'a>(
    records: &'a [AccidentRecord],
    preferences: &SubscriberPreferences,
    already_notified: &HashSet<String>,
) -> Vec<&'a AccidentRecord> {
    let selected: Vec<&AccidentRecord> = records
        .iter()
        .filter(|r| !already_notified.contains(&r.receipt_id))
        .filter(|r| preferences.matches(r))
        .collect();
    tracing::debug!(
        subscriber = %preferences.email,
        selected = selected.len(),
        "filtered batch for subscriber"
    );
    selected
}
