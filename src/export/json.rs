//! JSON export of reviewed transactions
//!
//! The file is a single JSON array; amounts are decimal strings.

use std::io::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, ReviewResult};
use crate::models::{ReviewStatus, Transaction};

/// One exported transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub date: NaiveDate,
    pub description: String,
    /// Exact decimal, e.g. "-50.00"
    pub amount: String,
    pub id: String,
    pub category: Option<String>,
    pub status: ReviewStatus,
    pub is_business: Option<bool>,
    pub exclusion_reason: Option<String>,
}

impl From<&Transaction> for ExportRecord {
    fn from(txn: &Transaction) -> Self {
        Self {
            date: txn.date,
            description: txn.description.clone(),
            amount: txn.amount.to_decimal_string(),
            id: txn.id.as_uuid().to_string(),
            category: txn.category.clone(),
            status: txn.status,
            is_business: txn.is_business,
            exclusion_reason: txn.exclusion_reason.clone(),
        }
    }
}

/// Write transactions as a pretty-printed JSON array. Returns the record count.
pub fn export_transactions_json<'a, W, I>(transactions: I, mut writer: W) -> ReviewResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let records: Vec<ExportRecord> = transactions.into_iter().map(ExportRecord::from).collect();

    serde_json::to_writer_pretty(&mut writer, &records)
        .map_err(|e| ReviewError::Export(format!("Failed to serialize export: {}", e)))?;
    writeln!(writer).map_err(|e| ReviewError::Export(e.to_string()))?;

    Ok(records.len())
}
