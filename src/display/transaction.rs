//! Transaction display formatting
//!
//! Register rows and detail blocks for the terminal.

use crate::models::{ReviewStatus, Transaction};

/// Currency and date conventions used when rendering
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub currency_symbol: String,
    pub date_format: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl DisplayOptions {
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            currency_symbol: settings.currency_symbol.clone(),
            date_format: settings.date_format.clone(),
        }
    }
}

fn status_icon(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Pending => " ",
        ReviewStatus::Excluded => "x",
        ReviewStatus::Skipped => "-",
    }
}

fn classification(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "B",
        Some(false) => "P",
        None => " ",
    }
}

/// Format a single register row
pub fn format_transaction_row(txn: &Transaction, selected: bool, options: &DisplayOptions) -> String {
    format!(
        "{}{}{} {} {:10} {:28} {:>12}",
        if selected { "*" } else { " " },
        status_icon(txn.status),
        classification(txn.is_business),
        txn.id,
        txn.date.format(&options.date_format),
        truncate(&txn.description, 28),
        txn.amount.format_with_symbol(&options.currency_symbol),
    )
}

/// Format a numbered register; `is_selected` marks selected rows
pub fn format_transaction_register<F>(
    transactions: &[&Transaction],
    is_selected: F,
    options: &DisplayOptions,
) -> String
where
    F: Fn(&Transaction) -> bool,
{
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:>3} {:3} {:12} {:10} {:28} {:>12}\n",
        "#", "", "ID", "Date", "Description", "Amount"
    ));
    output.push_str(&"-".repeat(74));
    output.push('\n');

    for (i, txn) in transactions.iter().enumerate() {
        output.push_str(&format!(
            "{:>3} {}\n",
            i + 1,
            format_transaction_row(txn, is_selected(*txn), options)
        ));
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, options: &DisplayOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Date:        {}\n",
        txn.date.format(&options.date_format)
    ));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(&options.currency_symbol)
    ));
    output.push_str(&format!("Description: {}\n", txn.description));

    if let Some(category) = &txn.category {
        output.push_str(&format!("Category:    {}\n", category));
    }

    output.push_str(&format!("Status:      {}\n", txn.status));

    let kind = match txn.is_business {
        Some(true) => "Business",
        Some(false) => "Personal",
        None => "(unclassified)",
    };
    output.push_str(&format!("Type:        {}\n", kind));

    if let Some(reason) = &txn.exclusion_reason {
        output.push_str(&format!("Reason:      {}\n", reason));
    }

    output
}

/// Truncate to `max_len` characters, marking the cut with "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::{NaiveDate, Utc};

    fn sample() -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            Money::from_cents(-5000),
            "Test Store",
        )
    }

    #[test]
    fn test_format_row() {
        let mut txn = sample();
        txn.set_business(true);
        txn.exclude("Transfer", Utc::now()).unwrap();

        let row = format_transaction_row(&txn, true, &DisplayOptions::default());
        assert!(row.starts_with("*xB "));
        assert!(row.contains("2025-01-15"));
        assert!(row.contains("Test Store"));
        assert!(row.contains("-$50.00"));
    }

    #[test]
    fn test_register_numbers_rows() {
        let a = sample();
        let b = sample();
        let output = format_transaction_register(&[&a, &b], |t| t.id == b.id, &DisplayOptions::default());

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("1    "));
        assert!(lines[3].trim_start().starts_with("2 *"));
    }

    #[test]
    fn test_empty_register() {
        let output = format_transaction_register(&[], |_| false, &DisplayOptions::default());
        assert_eq!(output, "No transactions found.\n");
    }

    #[test]
    fn test_details_show_reason() {
        let mut txn = sample();
        txn.exclude("Private purchase", Utc::now()).unwrap();
        let options = DisplayOptions {
            currency_symbol: "€".into(),
            date_format: "%d.%m.%Y".into(),
        };

        let details = format_transaction_details(&txn, &options);
        assert!(details.contains("Date:        15.01.2025"));
        assert!(details.contains("-€50.00"));
        assert!(details.contains("Status:      excluded"));
        assert!(details.contains("Reason:      Private purchase"));
        assert!(details.contains("(unclassified)"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer description", 10), "a much ...");
    }
}
