use std::io::Cursor;
use std::path::PathBuf;

use calamine::{Data, Reader, Xlsx};

use super::BatchSource;
use crate::error::AlertsError;
use crate::model::{RawAccidentRecord, MAX_EXACT_FLOAT};

/// Reads a batch exported to an xlsx workbook.
///
/// The first row of the sheet holds the column names; every following row
/// with at least one non-empty cell becomes a record.
pub struct XlsxBatchSource {
    path: PathBuf,
    sheet: Option<String>,
    name: String,
}

impl XlsxBatchSource {
    pub fn new(path: impl Into<PathBuf>, sheet: Option<String>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, sheet, name }
    }
}

impl BatchSource for XlsxBatchSource {
    fn load(&self) -> Result<Vec<RawAccidentRecord>, AlertsError> {
        let bytes = std::fs::read(&self.path)?;
        parse_xlsx_batch(&bytes, self.sheet.as_deref()).map_err(|e| AlertsError::BatchLoad {
            source_name: self.name.clone(),
            reason: e.to_string(),
        })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Parse xlsx bytes, reading `sheet` or the first worksheet.
pub fn parse_xlsx_batch(
    bytes: &[u8],
    sheet: Option<&str>,
) -> Result<Vec<RawAccidentRecord>, AlertsError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor).map_err(|e| {
        AlertsError::BatchLoad {
            source_name: "xlsx".into(),
            reason: format!("failed to open xlsx: {e}"),
        }
    })?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AlertsError::BatchLoad {
                source_name: "xlsx".into(),
                reason: "workbook has no sheets".into(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AlertsError::BatchLoad {
            source_name: "xlsx".into(),
            reason: format!("sheet '{sheet_name}' not found: {e}"),
        })?;

    let mut rows = range.rows();
    let header: Vec<Option<String>> = match rows.next() {
        Some(cells) => cells.iter().map(cell_as_string).collect(),
        None => return Ok(Vec::new()),
    };

    // A field may appear under its own name and under its extract alias.
    let fields: Vec<Option<&str>> = header
        .iter()
        .map(|column| column.as_deref().map(RawAccidentRecord::canonical_field))
        .collect();

    let mut records = Vec::new();
    for (index, cells) in rows.enumerate() {
        let object = row_object(&fields, cells, index + 2);
        if object.is_empty() {
            continue;
        }
        records.push(serde_json::from_value(serde_json::Value::Object(object))?);
    }

    tracing::debug!(sheet = %sheet_name, rows = records.len(), "read xlsx batch");
    Ok(records)
}

/// Build one record object keyed by field name. When a field is filled by
/// more than one column, the first non-empty column wins.
fn row_object(
    fields: &[Option<&str>],
    cells: &[Data],
    row: usize,
) -> serde_json::Map<String, serde_json::Value> {
    let mut object = serde_json::Map::new();
    for (field, cell) in fields.iter().zip(cells) {
        let (Some(field), Some(value)) = (field, cell_as_string(cell)) else {
            continue;
        };
        match object.get(*field) {
            None => {
                object.insert(field.to_string(), serde_json::Value::String(value));
            }
            Some(kept) if kept.as_str() != Some(value.as_str()) => {
                tracing::warn!(
                    row,
                    field = *field,
                    ignored = %value,
                    "field given twice with different values; keeping the first column"
                );
            }
            Some(_) => {}
        }
    }
    object
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT => {
            Some(format!("{}", *f as i64))
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}
