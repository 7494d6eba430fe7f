//! Export formatter turning stored submissions into downloadable JSON, CSV, or XLSX documents.

mod columns;
mod delimited;
mod json;
mod spreadsheet;

use std::fmt;
use std::str::FromStr;

use super::domain::Submission;
use super::media::MediaLocator;

pub use columns::{
    tabulate, Column, ColumnSet, Table, COLUMN_SET_VERSION, DATE_OF_BIRTH_FORMAT, FULL_COLUMNS,
    REGISTRATION_COLUMNS, SUBMISSION_DATE_FORMAT,
};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid export format '{0}' (expected json, csv, or excel)")]
    UnsupportedFormat(String),
    #[error("invalid column set '{0}' (expected registration or full)")]
    UnsupportedColumns(String),
    #[error("failed to encode json export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode csv export: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("failed to encode spreadsheet export: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Excel,
}

impl ExportFormat {
    pub const fn ordered() -> [Self; 3] {
        [Self::Json, Self::Csv, Self::Excel]
    }

    pub fn parse(raw: &str) -> Result<Self, ExportError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "excel" | "spreadsheet" | "xlsx" => Ok(Self::Excel),
            _ => Err(ExportError::UnsupportedFormat(raw.to_string())),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    pub const fn filename(self) -> &'static str {
        match self {
            Self::Json => "student_submissions.json",
            Self::Csv => "student_submissions.csv",
            Self::Excel => "student_submissions.xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Record selection and layout for an export request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub columns: ColumnSet,
    pub search: Option<String>,
}

/// Encoded export ready to be streamed back as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
}

impl ExportDocument {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Render `records` in the requested encoding. JSON ignores `columns` and carries every field,
/// with the passport as an absolute URL like the tabular formats.
pub fn export(
    records: &[Submission],
    format: ExportFormat,
    columns: ColumnSet,
    media: &MediaLocator,
) -> Result<ExportDocument, ExportError> {
    let bytes = match format {
        ExportFormat::Json => json::encode(records, media)?,
        ExportFormat::Csv => delimited::encode(&tabulate(records, columns.columns(), media))?,
        ExportFormat::Excel => spreadsheet::encode(&tabulate(records, columns.columns(), media))?,
    };

    Ok(ExportDocument {
        bytes,
        content_type: format.content_type(),
        filename: format.filename(),
    })
}
