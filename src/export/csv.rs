//! CSV export of reviewed transactions

use std::io::Write;

use crate::error::{ReviewError, ReviewResult};
use crate::models::Transaction;

/// Header row; the first three columns are fixed
pub const CSV_HEADER: [&str; 7] = [
    "Date",
    "Description",
    "Amount",
    "Category",
    "Status",
    "Business",
    "Exclusion Reason",
];

/// Write transactions as CSV, one row per record in the given order.
///
/// Returns the number of data rows written.
pub fn export_transactions_csv<'a, W, I>(transactions: I, writer: W) -> ReviewResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| ReviewError::Export(e.to_string()))?;

    let mut rows = 0;
    for txn in transactions {
        let date = txn.date.format("%Y-%m-%d").to_string();
        let amount = txn.amount.to_decimal_string();
        let status = txn.status.to_string();
        let business = match txn.is_business {
            Some(true) => "business",
            Some(false) => "personal",
            None => "",
        };

        csv_writer
            .write_record([
                date.as_str(),
                txn.description.as_str(),
                amount.as_str(),
                txn.category.as_deref().unwrap_or(""),
                status.as_str(),
                business,
                txn.exclusion_reason.as_deref().unwrap_or(""),
            ])
            .map_err(|e| ReviewError::Export(e.to_string()))?;
        rows += 1;
    }

    csv_writer
        .flush()
        .map_err(|e| ReviewError::Export(e.to_string()))?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::{NaiveDate, Utc};

    fn sample() -> Vec<Transaction> {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut transfer = Transaction::new(date, Money::from_cents(-5000), "Transfer, savings");
        transfer.exclude("Transfer", Utc::now()).unwrap();
        let mut lunch = Transaction::new(date, Money::from_cents(1234), "Client \"lunch\"");
        lunch.set_business(true);
        lunch.category = Some("Meals".into());
        vec![transfer, lunch]
    }

    #[test]
    fn test_header_and_rows() {
        let records = sample();
        let mut buffer = Vec::new();
        let rows = export_transactions_csv(&records, &mut buffer).unwrap();
        assert_eq!(rows, 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("Date,Description,Amount"));
        assert_eq!(
            lines[1],
            "2025-01-15,\"Transfer, savings\",-50.00,,excluded,,Transfer"
        );
        assert_eq!(
            lines[2],
            "2025-01-15,\"Client \"\"lunch\"\"\",12.34,Meals,pending,business,"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let mut buffer = Vec::new();
        let rows = export_transactions_csv(std::iter::empty(), &mut buffer).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Date,Description,Amount,Category,Status,Business,Exclusion Reason\n"
        );
    }
}
