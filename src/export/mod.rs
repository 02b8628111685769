//! Export module for txn-review
//!
//! Writes a list of transactions in one of two formats:
//! - CSV: spreadsheet-compatible, header `Date,Description,Amount,...`
//! - JSON: a single array of records
//!
//! Files are written atomically, so a failed export never leaves a
//! truncated file behind.

pub mod csv;
pub mod json;

pub use self::csv::{export_transactions_csv, CSV_HEADER};
pub use self::json::{export_transactions_json, ExportRecord};

use std::fmt;
use std::path::Path;

use crate::error::{ReviewError, ReviewResult};
use crate::models::Transaction;
use crate::storage::file_io::write_atomic;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// Export transactions to a file, returning the number of records written
pub fn export_to_file(
    path: &Path,
    format: ExportFormat,
    transactions: &[&Transaction],
) -> ReviewResult<usize> {
    let mut count = 0;
    write_atomic(path, ReviewError::Export, |writer| {
        let items = transactions.iter().copied();
        count = match format {
            ExportFormat::Csv => export_transactions_csv(items, writer)?,
            ExportFormat::Json => export_transactions_json(items, writer)?,
        };
        Ok(())
    })?;

    tracing::info!(path = %path.display(), %format, count, "Exported transactions");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::parse("yaml"), None);
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let txn = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            Money::from_cents(-2000),
            "Taxi",
        );
        let items = vec![&txn];

        let csv_path = temp_dir.path().join("out/review.csv");
        assert_eq!(export_to_file(&csv_path, ExportFormat::Csv, &items).unwrap(), 1);
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.contains("2025-04-05,Taxi,-20.00"));

        let json_path = temp_dir.path().join("review.json");
        assert_eq!(export_to_file(&json_path, ExportFormat::Json, &items).unwrap(), 1);
        let json = std::fs::read_to_string(&json_path).unwrap();
        assert!(json.trim_start().starts_with('['));
        assert!(!temp_dir.path().join("review.json.tmp").exists());
    }
}
