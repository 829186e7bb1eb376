use super::compile::{compile, CompiledRuleTables};
use super::schema::RiskFactorRuleSet;
use crate::error::AlertsError;

const RISK_FACTORS_YAML: &str = include_str!("../../../../rules/risk-factors.yaml");

/// Available predefined rule sets.
pub const PRESETS: &[&str] = &["risk-factors"];

/// Load a predefined rule set by name.
pub fn load_preset(name: &str) -> Result<RiskFactorRuleSet, AlertsError> {
    match name {
        "risk-factors" => super::parse_ruleset_str(RISK_FACTORS_YAML),
        _ => Err(AlertsError::RulesetInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

/// Compiled tables for the default preset.
pub fn default_tables() -> Result<CompiledRuleTables, AlertsError> {
    compile(&load_preset("risk-factors")?)
}
