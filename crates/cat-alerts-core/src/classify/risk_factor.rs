use crate::classify::outcome::RiskFactorAssignment;
use crate::model::AccidentRecord;
use crate::rules::compile::{CompiledRuleTables, TableKind};
use std::collections::BTreeSet;

/// Look up each classified field of a record in its table.
pub fn assign(record: &AccidentRecord, tables: &CompiledRuleTables) -> RiskFactorAssignment {
    let lookup = |kind: TableKind, raw: &Option<String>| -> Option<String> {
        raw.as_deref()
            .and_then(|value| tables.table(kind).get(value))
            .map(str::to_string)
    };

    let mut diagnosis_category = lookup(TableKind::DiagnosisCategory, &record.diagnosis_category);
    let excluded = lookup(TableKind::DiagnosisCategoryExclusion, &record.diagnosis_code);
    if diagnosis_category.is_some() && diagnosis_category == excluded {
        tracing::debug!(
            receipt = %record.receipt_id,
            code = ?diagnosis_category,
            "diagnosis category code suppressed by exclusion table"
        );
        diagnosis_category = None;
    }

    RiskFactorAssignment {
        generating_situation: lookup(TableKind::AgentSituation, &record.generating_situation),
        causative_agent: lookup(TableKind::AgentSituation, &record.causative_agent),
        injury_description: lookup(TableKind::InjuryDescription, &record.injury_description),
        diagnosis_code: lookup(TableKind::DiagnosisCode, &record.diagnosis_code),
        diagnosis_category,
    }
}

/// Merge per-field codes into one sorted, duplicate-free list.
///
/// Codes are fixed-width numeric strings, so lexicographic order is numeric order.
pub fn merge(assignment: &RiskFactorAssignment) -> Vec<String> {
    assignment
        .codes()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Assign and merge, storing both results on the record.
pub fn annotate(record: &mut AccidentRecord, tables: &CompiledRuleTables) {
    let assignment = assign(record, tables);
    record.risk_factor_codes = merge(&assignment);
    record.risk_factors = assignment;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::default_tables;

    fn record(
        situation: &str,
        agent: &str,
        injury: &str,
        diagnosis: &str,
        category: &str,
    ) -> AccidentRecord {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        AccidentRecord {
            receipt_id: "r1".into(),
            generating_situation: opt(situation),
            causative_agent: opt(agent),
            injury_description: opt(injury),
            diagnosis_code: opt(diagnosis),
            diagnosis_category: opt(category),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_fields_distinct_codes() {
        let tables = default_tables().unwrap();
        let rec = record("200044300", "303060000", "702045000", "J700", "T70");
        let assignment = assign(&rec, &tables);
        assert_eq!(assignment.generating_situation.as_deref(), Some("111"));
        assert_eq!(assignment.causative_agent.as_deref(), Some("121"));
        assert_eq!(assignment.injury_description.as_deref(), Some("131"));
        assert_eq!(assignment.diagnosis_code.as_deref(), Some("132"));
        assert_eq!(assignment.diagnosis_category.as_deref(), Some("141"));
        assert_eq!(merge(&assignment), vec!["111", "121", "131", "132", "141"]);
    }

    #[test]
    fn test_unmatched_category_yields_no_code() {
        let tables = default_tables().unwrap();
        let rec = record("200044300", "303060000", "702045000", "J700", "T99");
        let assignment = assign(&rec, &tables);
        assert_eq!(assignment.diagnosis_category, None);
        assert_eq!(merge(&assignment), vec!["111", "121", "131", "132"]);
    }

    #[test]
    fn test_category_suppressed_by_exclusion() {
        let tables = default_tables().unwrap();
        let rec = record("", "", "", "L504", "L50");
        let assignment = assign(&rec, &tables);
        assert_eq!(assignment.diagnosis_code.as_deref(), Some("161"));
        assert_eq!(assignment.diagnosis_category, None);
        assert_eq!(merge(&assignment), vec!["161"]);
    }

    #[test]
    fn test_category_kept_when_exclusion_does_not_apply() {
        let tables = default_tables().unwrap();
        let rec = record("", "", "", "L501", "L50");
        let assignment = assign(&rec, &tables);
        assert_eq!(assignment.diagnosis_code, None);
        assert_eq!(assignment.diagnosis_category.as_deref(), Some("161"));
    }

    #[test]
    fn test_duplicate_codes_merged() {
        let assignment = RiskFactorAssignment {
            generating_situation: Some("121".into()),
            causative_agent: Some("121".into()),
            injury_description: None,
            diagnosis_code: Some("111".into()),
            diagnosis_category: None,
        };
        assert_eq!(merge(&assignment), vec!["111", "121"]);
    }

    #[test]
    fn test_empty_record_has_no_codes() {
        let tables = default_tables().unwrap();
        let mut rec = record("", "", "", "", "");
        annotate(&mut rec, &tables);
        assert!(rec.risk_factor_codes.is_empty());
        assert_eq!(rec.risk_factors, RiskFactorAssignment::default());
    }
}
