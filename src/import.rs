//! Bank statement CSV import
//!
//! Reads a statement with a header row, maps the `Date`, `Description`,
//! `Amount` and optional `Category` columns by name, and stores each row as
//! a pending transaction. Rows already imported (same date, amount and
//! description, counted per statement) are skipped; malformed rows are
//! reported and do not stop the import.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{ReviewError, ReviewResult};
use crate::models::{Money, Transaction};
use crate::storage::JsonTransactionStore;

/// Fallback date formats tried after the configured one
const FALLBACK_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y",
];

/// Column positions resolved from the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date_column: usize,
    pub description_column: usize,
    pub amount_column: usize,
    pub category_column: Option<usize>,
}

impl ColumnMapping {
    /// Detect columns from header names (case-insensitive)
    pub fn from_headers(headers: &StringRecord) -> ReviewResult<Self> {
        let mut date_column = None;
        let mut description_column = None;
        let mut amount_column = None;
        let mut category_column = None;

        for (idx, header) in headers.iter().enumerate() {
            let h = header.trim().to_lowercase();

            if date_column.is_none() && (h.contains("date") || h.contains("posted")) {
                date_column = Some(idx);
            } else if amount_column.is_none() && h.contains("amount") {
                amount_column = Some(idx);
            } else if category_column.is_none() && h.contains("category") {
                category_column = Some(idx);
            } else if description_column.is_none()
                && (h.contains("description")
                    || h.contains("payee")
                    || h.contains("merchant")
                    || h.contains("details"))
            {
                description_column = Some(idx);
            }
        }

        let missing = |name: &str| ReviewError::Import(format!("Missing '{}' column in header", name));
        Ok(Self {
            date_column: date_column.ok_or_else(|| missing("Date"))?,
            description_column: description_column.ok_or_else(|| missing("Description"))?,
            amount_column: amount_column.ok_or_else(|| missing("Amount"))?,
            category_column,
        })
    }
}

/// A statement row that parsed cleanly
#[derive(Debug, Clone)]
pub struct ParsedRow {
    /// 1-based data row number (the header is row 0)
    pub row_number: usize,
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub category: Option<String>,
    pub import_id: String,
}

impl ParsedRow {
    fn into_transaction(self) -> Transaction {
        let mut txn = Transaction::new(self.date, self.amount, self.description);
        txn.category = self.category;
        txn.import_id = Some(self.import_id);
        txn
    }
}

/// A statement row that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row_number: usize,
    pub message: String,
}

/// Outcome of an import
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub errors: Vec<RowError>,
}

/// Parse a statement into rows and per-row errors
pub fn parse_csv<R: Read>(
    reader: R,
    date_format: &str,
) -> ReviewResult<(Vec<ParsedRow>, Vec<RowError>)> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ReviewError::Import(format!("Failed to read header row: {}", e)))?
        .clone();
    let mapping = ColumnMapping::from_headers(&headers)?;
    debug!(?mapping, "Detected statement columns");

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut occurrences = HashMap::new();
    for (idx, result) in reader.records().enumerate() {
        let row_number = idx + 1;
        let parsed = result
            .map_err(|e| format!("Error reading CSV record: {}", e))
            .and_then(|record| {
                parse_record(&record, row_number, &mapping, date_format, &mut occurrences)
            });

        match parsed {
            Ok(row) => rows.push(row),
            Err(message) => errors.push(RowError { row_number, message }),
        }
    }

    Ok((rows, errors))
}

fn parse_record(
    record: &StringRecord,
    row_number: usize,
    mapping: &ColumnMapping,
    date_format: &str,
    occurrences: &mut HashMap<(NaiveDate, i64, String), usize>,
) -> Result<ParsedRow, String> {
    let date_str = record
        .get(mapping.date_column)
        .ok_or_else(|| "Missing date column".to_string())?;
    let date = parse_date(date_str, date_format)?;

    let amount_str = record
        .get(mapping.amount_column)
        .ok_or_else(|| "Missing amount column".to_string())?;
    let amount = Money::parse(amount_str)
        .map_err(|e| format!("Could not parse amount '{}': {}", amount_str, e))?;

    let description = record
        .get(mapping.description_column)
        .unwrap_or_default()
        .to_string();

    let category = mapping
        .category_column
        .and_then(|col| record.get(col))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let seen = occurrences
        .entry((date, amount.cents(), description.trim().to_string()))
        .or_insert(0);
    let import_id = Transaction::generate_import_id(date, amount, &description, *seen);
    *seen += 1;

    Ok(ParsedRow {
        row_number,
        date,
        amount,
        description,
        category,
        import_id,
    })
}

/// Parse a date with the configured format, then common alternatives
fn parse_date(s: &str, primary_format: &str) -> Result<NaiveDate, String> {
    std::iter::once(primary_format)
        .chain(FALLBACK_DATE_FORMATS)
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("Could not parse date: '{}'", s))
}

/// Import a statement into the store
pub fn import_csv<R: Read>(
    store: &JsonTransactionStore,
    reader: R,
    date_format: &str,
) -> ReviewResult<ImportSummary> {
    let (rows, errors) = parse_csv(reader, date_format)?;
    let parsed = rows.len();

    let transactions = rows.into_iter().map(ParsedRow::into_transaction).collect();
    let inserted = store.insert_many(transactions)?;

    let summary = ImportSummary {
        imported: inserted.len(),
        duplicates: parsed - inserted.len(),
        errors,
    };
    info!(
        imported = summary.imported,
        duplicates = summary.duplicates,
        errors = summary.errors.len(),
        "Imported bank statement"
    );
    Ok(summary)
}

/// Import a statement file into the store
pub fn import_csv_file(
    store: &JsonTransactionStore,
    path: &Path,
    date_format: &str,
) -> ReviewResult<ImportSummary> {
    let file = File::open(path)
        .map_err(|e| ReviewError::Import(format!("Failed to open {}: {}", path.display(), e)))?;
    import_csv(store, file, date_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewStatus;
    use crate::storage::TransactionStore;
    use tempfile::TempDir;

    const STATEMENT: &str = "\
Date,Description,Amount,Category
2025-01-03,Coffee Shop,-4.50,Food
2025-01-04,\"ACME, Inc. salary\",\"2,500.00\",
2025-01-05,Bookshop,-19.99,
";

    fn create_test_store() -> (TempDir, JsonTransactionStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTransactionStore::open(temp_dir.path().join("transactions.json")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_mapping_from_headers() {
        let headers = StringRecord::from(vec!["Posted Date", "Amount", "Merchant", "Category"]);
        let mapping = ColumnMapping::from_headers(&headers).unwrap();
        assert_eq!(mapping.date_column, 0);
        assert_eq!(mapping.amount_column, 1);
        assert_eq!(mapping.description_column, 2);
        assert_eq!(mapping.category_column, Some(3));
    }

    #[test]
    fn test_mapping_requires_amount() {
        let headers = StringRecord::from(vec!["Date", "Description"]);
        let err = ColumnMapping::from_headers(&headers).unwrap_err();
        assert!(err.to_string().contains("Amount"));
    }

    #[test]
    fn test_parse_rows() {
        let (rows, errors) = parse_csv(STATEMENT.as_bytes(), "%Y-%m-%d").unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].amount.cents(), -450);
        assert_eq!(rows[0].category.as_deref(), Some("Food"));
        assert_eq!(rows[1].description, "ACME, Inc. salary");
        assert_eq!(rows[1].amount.cents(), 250_000);
        assert_eq!(rows[1].category, None);
    }

    #[test]
    fn test_alternate_date_format() {
        let csv = "Date,Description,Amount\n03/15/2025,Fuel,-40.00\n";
        let (rows, errors) = parse_csv(csv.as_bytes(), "%m/%d/%Y").unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn test_bad_rows_reported_not_fatal() {
        let csv = "Date,Description,Amount\nnot a date,X,-1.00\n2025-01-01,Y,abc\n2025-01-02,Z,-3.00\n";
        let (rows, errors) = parse_csv(csv.as_bytes(), "%Y-%m-%d").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].row_number, 1);
        assert!(errors[0].message.contains("date"));
        assert_eq!(errors[1].row_number, 2);
        assert!(errors[1].message.contains("amount"));
    }

    #[test]
    fn test_import_and_reimport_skips_duplicates() {
        let (_temp, store) = create_test_store();

        let first = import_csv(&store, STATEMENT.as_bytes(), "%Y-%m-%d").unwrap();
        assert_eq!(first.imported, 3);
        assert_eq!(first.duplicates, 0);

        let second = import_csv(&store, STATEMENT.as_bytes(), "%Y-%m-%d").unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 3);

        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|t| t.status == ReviewStatus::Pending));
        assert!(all.iter().all(|t| t.import_id.is_some()));
    }

    #[test]
    fn test_identical_rows_in_one_statement_are_kept() {
        let (_temp, store) = create_test_store();
        let csv = "Date,Description,Amount\n\
2025-02-01,Coffee,-3.20\n\
2025-02-01,Coffee,-3.20\n\
2025-02-01,Coffee,-4.10\n";

        let (rows, _) = parse_csv(csv.as_bytes(), "%Y-%m-%d").unwrap();
        assert_ne!(rows[0].import_id, rows[1].import_id);

        let first = import_csv(&store, csv.as_bytes(), "%Y-%m-%d").unwrap();
        assert_eq!(first.imported, 3);
        assert_eq!(first.duplicates, 0);

        let second = import_csv(&store, csv.as_bytes(), "%Y-%m-%d").unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(store.find_all().unwrap().len(), 3);
    }

    #[test]
    fn test_import_missing_file() {
        let (temp, store) = create_test_store();
        let err = import_csv_file(&store, &temp.path().join("nope.csv"), "%Y-%m-%d").unwrap_err();
        assert!(matches!(err, ReviewError::Import(_)));
    }
}
