use super::range::{expand_range, split_range};
use super::schema::{RiskFactorRuleSet, RuleField};
use crate::error::AlertsError;
use std::collections::HashMap;

/// Exact-match lookup from raw code to risk-factor code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    name: &'static str,
    entries: HashMap<String, String>,
}

impl LookupTable {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert `raw -> factor`, refusing to reassign a value to another factor.
    fn insert(&mut self, raw: String, factor: &str) -> Result<(), AlertsError> {
        match self.entries.get(&raw) {
            Some(existing) if existing != factor => Err(AlertsError::RuleConflict {
                table: self.name.to_string(),
                value: raw,
                existing: existing.clone(),
                incoming: factor.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(raw, factor.to_string());
                Ok(())
            }
        }
    }

    /// Fold another table into this one under the same conflict rule.
    fn absorb(&mut self, other: LookupTable) -> Result<(), AlertsError> {
        for (raw, factor) in other.entries {
            self.insert(raw, &factor)?;
        }
        Ok(())
    }
}

/// Which compiled table a lookup goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    AgentSituation,
    InjuryDescription,
    DiagnosisCode,
    DiagnosisCategory,
    DiagnosisCategoryExclusion,
}

/// Lookup tables compiled from a rule set, immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleTables {
    pub agent_situation: LookupTable,
    pub injury_description: LookupTable,
    pub diagnosis_code: LookupTable,
    pub diagnosis_category: LookupTable,
    pub diagnosis_category_exclusion: LookupTable,
}

impl CompiledRuleTables {
    pub fn table(&self, kind: TableKind) -> &LookupTable {
        match kind {
            TableKind::AgentSituation => &self.agent_situation,
            TableKind::InjuryDescription => &self.injury_description,
            TableKind::DiagnosisCode => &self.diagnosis_code,
            TableKind::DiagnosisCategory => &self.diagnosis_category,
            TableKind::DiagnosisCategoryExclusion => &self.diagnosis_category_exclusion,
        }
    }

    pub fn tables(&self) -> [&LookupTable; 5] {
        [
            &self.agent_situation,
            &self.injury_description,
            &self.diagnosis_code,
            &self.diagnosis_category,
            &self.diagnosis_category_exclusion,
        ]
    }
}

/// Compile a rule set into per-field lookup tables.
///
/// Fails on the first raw value claimed by two different risk factors within
/// one table, and on malformed range entries.
pub fn compile(rules: &RiskFactorRuleSet) -> Result<CompiledRuleTables, AlertsError> {
    let mut situation = compile_field(rules, RuleField::GeneratingSituation)?;
    let agent = compile_field(rules, RuleField::CausativeAgent)?;
    situation.name = "agent_situation";
    situation.absorb(agent)?;

    let tables = CompiledRuleTables {
        agent_situation: situation,
        injury_description: compile_field(rules, RuleField::InjuryDescription)?,
        diagnosis_code: compile_field(rules, RuleField::DiagnosisCode)?,
        diagnosis_category: compile_field(rules, RuleField::DiagnosisCategory)?,
        diagnosis_category_exclusion: compile_field(rules, RuleField::DiagnosisCategoryExclusion)?,
    };

    tracing::info!(
        ruleset = %rules.name,
        factors = rules.factors.len(),
        agent_situation = tables.agent_situation.len(),
        injury_description = tables.injury_description.len(),
        diagnosis_code = tables.diagnosis_code.len(),
        diagnosis_category = tables.diagnosis_category.len(),
        diagnosis_category_exclusion = tables.diagnosis_category_exclusion.len(),
        "compiled risk-factor tables"
    );

    Ok(tables)
}

fn compile_field(rules: &RiskFactorRuleSet, field: RuleField) -> Result<LookupTable, AlertsError> {
    let mut table = LookupTable::new(field.name());

    for (factor, def) in &rules.factors {
        for entry in def.entries(field) {
            let entry = entry.trim();
            match split_range(entry) {
                Some((start, end)) if field.accepts_ranges() => {
                    for code in expand_range(start, end)? {
                        table.insert(code, factor)?;
                    }
                }
                _ => table.insert(entry.to_string(), factor)?,
            }
        }
    }

    tracing::debug!(field = field.name(), entries = table.len(), "compiled field table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::schema::RiskFactorRuleDef;
    use std::collections::BTreeMap;

    fn ruleset(factors: Vec<(&str, RiskFactorRuleDef)>) -> RiskFactorRuleSet {
        RiskFactorRuleSet {
            name: "Test".into(),
            description: None,
            version: "1.0".into(),
            factors: factors
                .into_iter()
                .map(|(code, def)| (code.to_string(), def))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compile_literals_and_ranges() {
        let rules = ruleset(vec![
            (
                "111",
                RiskFactorRuleDef {
                    generating_situation: strings(&["200044300"]),
                    ..Default::default()
                },
            ),
            (
                "151",
                RiskFactorRuleDef {
                    diagnosis_code: strings(&["H833", "H900-H903"]),
                    ..Default::default()
                },
            ),
        ]);
        let tables = compile(&rules).unwrap();
        assert_eq!(tables.agent_situation.get("200044300"), Some("111"));
        assert_eq!(tables.diagnosis_code.get("H833"), Some("151"));
        assert_eq!(tables.diagnosis_code.get("H902"), Some("151"));
        assert_eq!(tables.diagnosis_code.len(), 5);
        assert_eq!(tables.diagnosis_code.get("H904"), None);
    }

    #[test]
    fn test_hyphen_is_literal_outside_diagnosis_fields() {
        let rules = ruleset(vec![(
            "131",
            RiskFactorRuleDef {
                injury_description: strings(&["702-045"]),
                ..Default::default()
            },
        )]);
        let tables = compile(&rules).unwrap();
        assert_eq!(tables.injury_description.get("702-045"), Some("131"));
    }

    #[test]
    fn test_conflicting_factors_rejected() {
        let rules = ruleset(vec![
            (
                "132",
                RiskFactorRuleDef {
                    diagnosis_code: strings(&["J700"]),
                    ..Default::default()
                },
            ),
            (
                "133",
                RiskFactorRuleDef {
                    diagnosis_code: strings(&["J690-J701"]),
                    ..Default::default()
                },
            ),
        ]);
        let err = compile(&rules).unwrap_err();
        match err {
            AlertsError::RuleConflict {
                table,
                value,
                existing,
                incoming,
            } => {
                assert_eq!(table, "diagnosis_code");
                assert_eq!(value, "J700");
                assert_eq!(existing, "132");
                assert_eq!(incoming, "133");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_situation_and_agent_union_detects_conflicts() {
        let rules = ruleset(vec![
            (
                "111",
                RiskFactorRuleDef {
                    generating_situation: strings(&["303060000"]),
                    ..Default::default()
                },
            ),
            (
                "121",
                RiskFactorRuleDef {
                    causative_agent: strings(&["303060000"]),
                    ..Default::default()
                },
            ),
        ]);
        let err = compile(&rules).unwrap_err();
        assert!(matches!(
            err,
            AlertsError::RuleConflict { ref table, .. } if table == "agent_situation"
        ));
    }

    #[test]
    fn test_same_factor_may_claim_value_twice() {
        let rules = ruleset(vec![(
            "111",
            RiskFactorRuleDef {
                generating_situation: strings(&["200044300"]),
                causative_agent: strings(&["200044300"]),
                ..Default::default()
            },
        )]);
        let tables = compile(&rules).unwrap();
        assert_eq!(tables.agent_situation.len(), 1);
        assert_eq!(tables.agent_situation.name(), "agent_situation");
    }

    #[test]
    fn test_malformed_range_aborts_compile() {
        let rules = ruleset(vec![(
            "141",
            RiskFactorRuleDef {
                diagnosis_category: strings(&["T70-T1"]),
                ..Default::default()
            },
        )]);
        assert!(matches!(
            compile(&rules),
            Err(AlertsError::RangeLengthMismatch { .. })
        ));
    }
}
