//! Audit entry data structures
//!
//! One entry per committed record mutation, including the writes undo
//! makes when restoring prior state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::review::ReviewAction;

use super::diff::summarize_change;

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the mutation was committed (UTC)
    pub timestamp: DateTime<Utc>,

    /// Review action that produced the change
    pub action: ReviewAction,

    /// ID of the affected transaction
    pub transaction_id: String,

    /// Transaction description, for readability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Record before the mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// Record after the mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable change summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AuditEntry {
    /// Build an entry from the before/after versions of one record
    pub fn record(action: ReviewAction, before: &Transaction, after: &Transaction) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            transaction_id: after.id.to_string(),
            description: Some(after.description.clone()),
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            summary: summarize_change(before, after),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action.to_string().to_uppercase(),
            self.transaction_id
        );

        if let Some(description) = &self.description {
            output.push_str(&format!(" ({})", description));
        }

        if let Some(summary) = &self.summary {
            output.push_str(&format!("\n  Changes: {}", summary));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn before_after() -> (Transaction, Transaction) {
        let before = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 7, 9).unwrap(),
            Money::from_cents(-1500),
            "Bookshop",
        );
        let mut after = before.clone();
        after.skip().unwrap();
        (before, after)
    }

    #[test]
    fn test_record_entry() {
        let (before, after) = before_after();
        let entry = AuditEntry::record(ReviewAction::Skip, &before, &after);

        assert_eq!(entry.action, ReviewAction::Skip);
        assert_eq!(entry.transaction_id, after.id.to_string());
        assert_eq!(entry.description.as_deref(), Some("Bookshop"));
        assert!(entry.before.is_some());
        assert_eq!(entry.summary.as_deref(), Some("status: pending -> skipped"));
    }

    #[test]
    fn test_serialization() {
        let (before, after) = before_after();
        let entry = AuditEntry::record(ReviewAction::Skip, &before, &after);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"action\":\"skip\""));
        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.action, ReviewAction::Skip);
        assert_eq!(deserialized.transaction_id, entry.transaction_id);
    }

    #[test]
    fn test_human_readable_format() {
        let (before, after) = before_after();
        let formatted = AuditEntry::record(ReviewAction::Skip, &before, &after).format_human_readable();

        assert!(formatted.contains("SKIP"));
        assert!(formatted.contains("Bookshop"));
        assert!(formatted.contains("Changes: status: pending -> skipped"));
    }
}
