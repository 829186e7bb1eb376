use cat_alerts_core::model::AccidentRecord;
use cat_alerts_core::EnrichmentResult;

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn joined_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".into()
    } else {
        values.join(", ")
    }
}

pub fn print(result: &EnrichmentResult) {
    let width = result
        .records
        .iter()
        .map(|r| r.receipt_id.len())
        .max()
        .unwrap_or(10)
        .max("Receipt".len());

    println!(
        "  {:<width$}  {:<width$}  {:<20}  {:<12}  Consequences",
        "Receipt",
        "Root",
        "Employer",
        "Risk factors",
        width = width
    );
    println!("  {}", "-".repeat(width * 2 + 52));

    for record in &result.records {
        print_record(record, width);
    }

    println!("\n  {} record(s) enriched", result.records.len());

    if !result.rejected.is_empty() {
        println!("\n  Rejected:");
        for rejected in &result.rejected {
            println!(
                "    {}  {}",
                or_dash(rejected.receipt_id.as_deref()),
                rejected.reason
            );
        }
    }
}

fn print_record(record: &AccidentRecord, width: usize) {
    println!(
        "  {:<width$}  {:<width$}  {:<20}  {:<12}  {}",
        record.receipt_id,
        record.root_or_self(),
        or_dash(record.formatted_tax_id.as_deref()),
        joined_or_dash(&record.risk_factor_codes),
        joined_or_dash(&record.consequence_labels),
        width = width
    );
}
