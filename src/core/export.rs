//! CSV export of records and derived views
//!
//! Cells are rendered from [`Record::field_value`], so any queryable field,
//! aliases included, can become a column.

use crate::core::error::ExportError;
use crate::core::field::FieldValue;
use crate::core::query::DerivedView;
use crate::core::record::Record;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// One output column: the field it reads and its header label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    pub field: String,
    pub header: String,
}

impl ExportColumn {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
        }
    }

    /// Every queryable field of `R`, headed by its own name
    pub fn all<R: Record>() -> Vec<Self> {
        R::fields().iter().map(|field| Self::from(*field)).collect()
    }
}

impl From<&str> for ExportColumn {
    fn from(field: &str) -> Self {
        Self::new(field, field)
    }
}

/// A finished export, ready to be saved or downloaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvExport {
    /// Suggested file name, e.g. "team_members-export-1718700000000.csv"
    pub filename: String,
    /// Data rows, header excluded
    pub rows: usize,
    pub content: String,
}

/// Render records as CSV text with a header row
pub fn write_csv<R: Record>(records: &[R], columns: &[ExportColumn]) -> Result<String, ExportError> {
    if let Some(column) = columns.iter().find(|c| !R::has_field(&c.field)) {
        return Err(ExportError::UnknownColumn {
            collection: R::collection().to_string(),
            field: column.field.clone(),
        });
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|c| c.header.as_str()))
        .map_err(csv_error)?;
    for record in records {
        writer
            .write_record(columns.iter().map(|c| cell(record.field_value(&c.field))))
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| ExportError::Csv {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| ExportError::Csv {
        message: e.to_string(),
    })
}

/// Render records and name the file after the collection
pub fn export_csv<R: Record>(records: &[R], columns: &[ExportColumn]) -> Result<CsvExport, ExportError> {
    let content = write_csv(records, columns)?;
    tracing::debug!(
        collection = R::collection(),
        rows = records.len(),
        columns = columns.len(),
        "csv export written"
    );

    Ok(CsvExport {
        filename: export_filename(R::collection(), Utc::now()),
        rows: records.len(),
        content,
    })
}

impl<R: Record> DerivedView<R> {
    /// Export this view's records in view order
    pub fn to_csv(&self, columns: &[ExportColumn]) -> Result<CsvExport, ExportError> {
        export_csv(&self.records, columns)
    }
}

fn export_filename(collection: &str, at: DateTime<Utc>) -> String {
    format!("{}-export-{}.csv", collection, at.timestamp_millis())
}

fn cell(value: Option<FieldValue>) -> String {
    match value {
        None | Some(FieldValue::Null) => String::new(),
        Some(FieldValue::String(s)) => s,
        Some(FieldValue::Integer(n)) => n.to_string(),
        Some(FieldValue::Float(f)) => f.to_string(),
        Some(FieldValue::Boolean(b)) => b.to_string(),
        Some(FieldValue::Date(d)) => d.format("%Y-%m-%d").to_string(),
        Some(FieldValue::DateTime(dt)) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        Some(FieldValue::List(items)) => items.join("; "),
    }
}

fn csv_error(e: csv::Error) -> ExportError {
    ExportError::Csv {
        message: e.to_string(),
    }
}
