pub mod builtin;
pub mod compile;
pub mod range;
pub mod schema;

use crate::error::AlertsError;
use schema::RiskFactorRuleSet;
use std::path::Path;

pub use compile::{compile, CompiledRuleTables, LookupTable, TableKind};
pub use range::expand_range;

/// Load a rule set from a YAML or JSON file (chosen by extension, YAML otherwise).
pub fn load_ruleset(path: &Path) -> Result<RiskFactorRuleSet, AlertsError> {
    let content = std::fs::read_to_string(path).map_err(|e| AlertsError::RulesetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_ruleset(&content, path)
}

/// Parse a rule set, using `source` for the format hint and error context.
pub fn parse_ruleset(content: &str, source: &Path) -> Result<RiskFactorRuleSet, AlertsError> {
    let is_json = source
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    };
    let ruleset: RiskFactorRuleSet = parsed.map_err(|reason| AlertsError::RulesetLoad {
        path: source.to_path_buf(),
        reason,
    })?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Parse a YAML rule set from a string (no file path context).
pub fn parse_ruleset_str(yaml: &str) -> Result<RiskFactorRuleSet, AlertsError> {
    let ruleset: RiskFactorRuleSet = serde_yaml::from_str(yaml)?;
    validate_ruleset(&ruleset)?;
    Ok(ruleset)
}

/// Validate that a rule set is well-formed. Conflicts are caught by `compile`.
pub fn validate_ruleset(ruleset: &RiskFactorRuleSet) -> Result<(), AlertsError> {
    if ruleset.name.trim().is_empty() {
        return Err(AlertsError::RulesetInvalid("name must not be empty".into()));
    }

    if ruleset.factors.is_empty() {
        return Err(AlertsError::RulesetInvalid(
            "factors must not be empty".into(),
        ));
    }

    for (code, def) in &ruleset.factors {
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AlertsError::RulesetInvalid(format!(
                "risk factor code '{}' must be numeric",
                code
            )));
        }

        for field in schema::RuleField::ALL {
            if def.entries(field).iter().any(|e| e.trim().is_empty()) {
                return Err(AlertsError::RulesetInvalid(format!(
                    "risk factor '{}' has an empty entry in '{}'",
                    code,
                    field.name()
                )));
            }
        }
    }

    Ok(())
}

/// Load and compile in one step: a rule set that fails here must abort the run.
pub fn load_tables(path: &Path) -> Result<CompiledRuleTables, AlertsError> {
    compile(&load_ruleset(path)?)
}
