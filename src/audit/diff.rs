//! Change summaries for audit entries
//!
//! Only the fields a review action can touch are compared.

use crate::models::Transaction;

/// Describe what changed between two versions of a record, e.g.
/// `status: pending -> excluded, reason: (none) -> "Transfer"`
pub fn summarize_change(before: &Transaction, after: &Transaction) -> Option<String> {
    let mut changes = Vec::new();

    if before.status != after.status {
        changes.push(format!("status: {} -> {}", before.status, after.status));
    }

    if before.is_business != after.is_business {
        changes.push(format!(
            "classification: {} -> {}",
            format_flag(before.is_business),
            format_flag(after.is_business)
        ));
    }

    if before.exclusion_reason != after.exclusion_reason {
        changes.push(format!(
            "reason: {} -> {}",
            format_reason(before.exclusion_reason.as_deref()),
            format_reason(after.exclusion_reason.as_deref())
        ));
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_flag(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "business",
        Some(false) => "personal",
        None => "(unset)",
    }
}

fn format_reason(reason: Option<&str>) -> String {
    match reason {
        None => "(none)".to_string(),
        Some(s) if s.chars().count() > 40 => {
            let truncated: String = s.chars().take(37).collect();
            format!("\"{}...\"", truncated)
        }
        Some(s) => format!("\"{}\"", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::{NaiveDate, Utc};

    fn pending() -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            Money::from_cents(-999),
            "Parking",
        )
    }

    #[test]
    fn test_exclude_summary() {
        let before = pending();
        let mut after = before.clone();
        after.exclude("Transfer", Utc::now()).unwrap();

        assert_eq!(
            summarize_change(&before, &after).unwrap(),
            "status: pending -> excluded, reason: (none) -> \"Transfer\""
        );
    }

    #[test]
    fn test_flag_summary() {
        let before = pending();
        let mut after = before.clone();
        after.set_business(true);

        assert_eq!(
            summarize_change(&before, &after).unwrap(),
            "classification: (unset) -> business"
        );
    }

    #[test]
    fn test_no_change() {
        let before = pending();
        assert!(summarize_change(&before, &before.clone()).is_none());
    }

    #[test]
    fn test_long_reason_truncated() {
        let before = pending();
        let mut after = before.clone();
        after.exclude("x".repeat(60), Utc::now()).unwrap();

        let summary = summarize_change(&before, &after).unwrap();
        assert!(summary.ends_with("...\""));
    }
}
