use cat_alerts_core::classify::consequence::ConsequenceClassifier;
use cat_alerts_core::error::AlertsError;
use cat_alerts_core::rules::{self, builtin, CompiledRuleTables};
use cat_alerts_core::source::json::JsonBatchSource;
use cat_alerts_core::source::xlsx::XlsxBatchSource;
use cat_alerts_core::source::BatchSource;
use std::path::{Path, PathBuf};

use crate::output;

/// Rule file if given, the built-in preset otherwise.
pub fn load_tables(rule_file: Option<&Path>) -> Result<CompiledRuleTables, AlertsError> {
    match rule_file {
        Some(path) => {
            tracing::info!(rules = %path.display(), "using custom rule file");
            rules::load_tables(path)
        }
        None => builtin::default_tables(),
    }
}

pub fn run(
    input_file: PathBuf,
    rule_file: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
    sheet: Option<String>,
) -> Result<(), AlertsError> {
    let tables = load_tables(rule_file.as_deref())?;
    let classifier = ConsequenceClassifier::default();

    let is_xlsx = input_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false);

    let source: Box<dyn BatchSource> = if is_xlsx {
        Box::new(XlsxBatchSource::new(input_file, sheet))
    } else {
        Box::new(JsonBatchSource::new(input_file))
    };

    let result = cat_alerts_core::enrich_from_source(source.as_ref(), &tables, &classifier)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&result)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Enriched {} record(s), written to {}",
                result.records.len(),
                path.display()
            );
            if !result.rejected.is_empty() {
                eprintln!("  {} record(s) rejected", result.rejected.len());
            }
        }
        None => match output_format {
            "json" => output::json::print(&result)?,
            _ => output::table::print(&result),
        },
    }

    Ok(())
}
