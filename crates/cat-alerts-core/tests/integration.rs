//! Integration tests for the enrich_batch() pipeline.
//!
//! Uses a MockSource that hands back pre-built rows, so no batch files are
//! needed on disk.

use std::collections::HashSet;

use cat_alerts_core::classify::consequence::ConsequenceClassifier;
use cat_alerts_core::error::AlertsError;
use cat_alerts_core::filter::{filter_for_subscriber, SubscriberPreferences};
use cat_alerts_core::model::{AccidentType, RawAccidentRecord};
use cat_alerts_core::rules::builtin::default_tables;
use cat_alerts_core::rules::{compile, parse_ruleset_str};
use cat_alerts_core::source::json::parse_json_batch;
use cat_alerts_core::source::BatchSource;
use cat_alerts_core::{enrich_batch, enrich_from_source};

struct MockSource {
    rows: Vec<RawAccidentRecord>,
}

impl BatchSource for MockSource {
    fn load(&self) -> Result<Vec<RawAccidentRecord>, AlertsError> {
        Ok(self.rows.clone())
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}

fn row(receipt: &str, previous: Option<&str>) -> RawAccidentRecord {
    RawAccidentRecord {
        receipt_id: Some(receipt.into()),
        previous_receipt_id: previous.map(str::to_string),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Test 1: A reopening chain collapses to its latest receipt
// ---------------------------------------------------------------------------
#[test]
fn chain_collapses_to_latest_receipt() {
    let source = MockSource {
        rows: vec![
            row("c001", None),
            row("c002", Some("c001")),
            row("c003", Some("c002")),
            row("a001", None),
        ],
    };

    let result = enrich_from_source(
        &source,
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    )
    .unwrap();

    assert!(result.rejected.is_empty());
    let ids: Vec<(&str, Option<&str>)> = result
        .records
        .iter()
        .map(|r| (r.receipt_id.as_str(), r.root_receipt_id.as_deref()))
        .collect();
    assert_eq!(ids, vec![("a001", Some("a001")), ("c003", Some("c001"))]);
}

// ---------------------------------------------------------------------------
// Test 2: Consequences, risk factors and identifiers on one record
// ---------------------------------------------------------------------------
#[test]
fn record_is_fully_enriched() {
    let raw = RawAccidentRecord {
        generating_situation: Some("200004300".into()),
        causative_agent: Some("303060000".into()),
        injury_description: Some("702045000".into()),
        diagnosis_code: Some("s681".into()),
        hospitalization_indicator: Some("S".into()),
        treatment_days: Some("40".into()),
        tax_id_type: Some("2".into()),
        tax_id: Some("12345678909".into()),
        activity_code: Some("4120400".into()),
        occupation_code: Some("715210".into()),
        ..row("r001", None)
    };

    let result = enrich_batch(
        vec![raw],
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    );

    assert_eq!(result.records.len(), 1);
    let rec = &result.records[0];
    assert_eq!(
        rec.consequence_labels,
        vec![
            "Hospitalization",
            "Finger amputation",
            "Treatment duration over 30 days"
        ]
    );
    assert_eq!(rec.risk_factor_codes, vec!["111", "121", "131"]);
    assert_eq!(rec.risk_factors.generating_situation.as_deref(), Some("111"));
    assert_eq!(rec.risk_factors.causative_agent.as_deref(), Some("121"));
    assert_eq!(rec.formatted_tax_id.as_deref(), Some("123.456.789-09"));
    assert_eq!(rec.formatted_activity_code.as_deref(), Some("4120-4/00"));
    assert_eq!(rec.formatted_occupation_code.as_deref(), Some("7152-10"));
}

// ---------------------------------------------------------------------------
// Test 3: Exclusion table suppresses a redundant category code
// ---------------------------------------------------------------------------
#[test]
fn category_code_suppressed_by_exclusion() {
    let mut suppressed = row("r001", None);
    suppressed.diagnosis_code = Some("L504".into());
    let mut kept = row("r002", None);
    kept.diagnosis_code = Some("L501".into());

    let result = enrich_batch(
        vec![suppressed, kept],
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    );

    assert_eq!(result.records[0].risk_factors.diagnosis_code.as_deref(), Some("161"));
    assert_eq!(result.records[0].risk_factors.diagnosis_category, None);
    assert_eq!(result.records[0].risk_factor_codes, vec!["161"]);
    assert_eq!(result.records[1].risk_factors.diagnosis_category.as_deref(), Some("161"));
}

// ---------------------------------------------------------------------------
// Test 4: Bad rows are set aside, the rest of the batch goes through
// ---------------------------------------------------------------------------
#[test]
fn bad_rows_rejected_without_aborting() {
    let mut bad_duration = row("r002", None);
    bad_duration.treatment_days = Some("n/a".into());

    let result = enrich_batch(
        vec![
            row("r001", None),
            RawAccidentRecord::default(),
            bad_duration,
            row("x001", Some("x002")),
            row("x002", Some("x001")),
        ],
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    );

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].receipt_id, "r001");
    assert_eq!(result.rejected.len(), 4);
    let rejected: HashSet<Option<&str>> = result
        .rejected
        .iter()
        .map(|r| r.receipt_id.as_deref())
        .collect();
    assert!(rejected.contains(&None));
    assert!(rejected.contains(&Some("r002")));
    assert!(rejected.contains(&Some("x001")));
    assert!(rejected.contains(&Some("x002")));
}

// ---------------------------------------------------------------------------
// Test 5: Conflicting rules never reach the pipeline
// ---------------------------------------------------------------------------
#[test]
fn conflicting_rules_fail_to_compile() {
    let yaml = r#"
name: conflicting
version: "1"
factors:
  "111":
    generating_situation: ["200004300"]
  "121":
    causative_agent: ["200004300"]
"#;
    let rules = parse_ruleset_str(yaml).unwrap();
    let err = compile(&rules).unwrap_err();
    match err {
        AlertsError::RuleConflict {
            table,
            value,
            existing,
            incoming,
        } => {
            assert_eq!(table, "agent_situation");
            assert_eq!(value, "200004300");
            assert_eq!(existing, "111");
            assert_eq!(incoming, "121");
        }
        other => panic!("expected RuleConflict, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test 6: Extract column names through to a subscriber selection
// ---------------------------------------------------------------------------
#[test]
fn extract_rows_filtered_for_subscriber() {
    let json = br#"[
        {"meta_nr_recibo": "r001", "sguf_local_acidente": "SP", "tpacid": 1, "indcatobito": "S"},
        {"meta_nr_recibo": "r002", "sguf_local_acidente": "SP", "tpacid": 3, "indcatobito": "S"},
        {"meta_nr_recibo": "r003", "sguf_local_acidente": "RJ", "tpacid": 1, "indcatobito": "S"},
        {"meta_nr_recibo": "r004", "sguf_local_acidente": "SP", "tpacid": 1, "indcatobito": "N"}
    ]"#;
    let raw = parse_json_batch(json).unwrap();
    let result = enrich_batch(
        raw,
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    );
    assert_eq!(result.records.len(), 4);

    let prefs = SubscriberPreferences {
        email: "inspector@example.org".into(),
        state: Some("SP".into()),
        accident_types: vec![AccidentType::Typical],
        consequences: Some(vec!["Death".into()]),
        ..Default::default()
    };
    let selected = filter_for_subscriber(&result.records, &prefs, &HashSet::new());
    let ids: Vec<&str> = selected.iter().map(|r| r.receipt_id.as_str()).collect();
    assert_eq!(ids, vec!["r001"]);
}

// ---------------------------------------------------------------------------
// Test 7: A rejected middle link still connects its chain
// ---------------------------------------------------------------------------
#[test]
fn rejected_middle_link_keeps_chain_intact() {
    let mut middle = row("c002", Some("c001"));
    middle.treatment_days = Some("n/a".into());

    let result = enrich_batch(
        vec![row("c001", None), middle, row("c003", Some("c002"))],
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    );

    let survivors: Vec<(&str, Option<&str>)> = result
        .records
        .iter()
        .map(|r| (r.receipt_id.as_str(), r.root_receipt_id.as_deref()))
        .collect();
    assert_eq!(survivors, vec![("c003", Some("c001"))]);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].receipt_id.as_deref(), Some("c002"));
}

// ---------------------------------------------------------------------------
// Test 8: Numeric receipt ids beyond 64 bits stay distinct
// ---------------------------------------------------------------------------
#[test]
fn oversized_numeric_receipts_stay_distinct() {
    let json = br#"[
        {"meta_nr_recibo": 12345678901234567890123},
        {"meta_nr_recibo": 98765432109876543210987}
    ]"#;
    let result = enrich_batch(
        parse_json_batch(json).unwrap(),
        &default_tables().unwrap(),
        &ConsequenceClassifier::default(),
    );
    let ids: Vec<&str> = result.records.iter().map(|r| r.receipt_id.as_str()).collect();
    assert_eq!(ids, vec!["12345678901234567890123", "98765432109876543210987"]);
}
