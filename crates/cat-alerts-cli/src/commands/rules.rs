use cat_alerts_core::error::AlertsError;
use cat_alerts_core::rules::range::split_range;
use cat_alerts_core::rules::schema::{RiskFactorRuleSet, RuleField};
use cat_alerts_core::rules::{self, builtin};
use std::path::Path;

fn load(rule_file: Option<&Path>) -> Result<RiskFactorRuleSet, AlertsError> {
    match rule_file {
        Some(path) => rules::load_ruleset(path),
        None => builtin::load_preset("risk-factors"),
    }
}

pub fn show(rule_file: Option<&Path>) -> Result<(), AlertsError> {
    let rs = load(rule_file)?;
    let tables = rules::compile(&rs)?;

    println!("{} (version {})\n", rs.name, rs.version);
    if let Some(ref desc) = rs.description {
        println!("{}\n", desc);
    }

    println!("Risk factors:\n");
    for (code, def) in &rs.factors {
        println!("  {}  {}", code, def.description.as_deref().unwrap_or(""));
        for field in RuleField::ALL {
            let entries = def.entries(field);
            if !entries.is_empty() {
                println!("         {:<30} {}", field.name(), entries.join(", "));
            }
        }
        println!();
    }

    println!("Compiled lookup tables:\n");
    for table in tables.tables() {
        println!("  {:<30} {:>6} code(s)", table.name(), table.len());
    }
    println!();

    Ok(())
}

pub fn validate(file: &Path) -> Result<(), AlertsError> {
    let rs = rules::load_ruleset(file)?;
    let tables = rules::compile(&rs)?;

    println!("Ruleset '{}' (v{}) is valid.", rs.name, rs.version);
    println!("  Risk factors: {}", rs.factors.len());
    let codes: usize = tables.tables().iter().map(|t| t.len()).sum();
    println!("  Lookup codes: {}", codes);

    // Warnings, not errors
    let mut warnings = Vec::new();
    for (code, def) in &rs.factors {
        if RuleField::ALL.iter().all(|f| def.entries(*f).is_empty()) {
            warnings.push(format!("risk factor '{}' has no codes", code));
        }
        for field in RuleField::ALL {
            if field.accepts_ranges() {
                continue;
            }
            for entry in def.entries(field) {
                if split_range(entry).is_some() {
                    warnings.push(format!(
                        "risk factor '{}' entry '{}' in '{}' is matched literally; ranges only expand in diagnosis fields",
                        code,
                        entry,
                        field.name()
                    ));
                }
            }
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

pub fn expand(range: &str) -> Result<(), AlertsError> {
    let (start, end) = split_range(range).ok_or_else(|| AlertsError::InvalidField {
        field: "range",
        value: range.to_string(),
    })?;
    let codes = rules::expand_range(&start.to_uppercase(), &end.to_uppercase())?;

    for code in &codes {
        println!("{code}");
    }
    eprintln!("{} code(s)", codes.len());

    Ok(())
}
