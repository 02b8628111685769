//! Single-level undo
//!
//! Holds at most one snapshot: the records as they were before the most
//! recent individual or batch mutation. Taking a new snapshot replaces the
//! old one; consuming it leaves the manager empty.

use chrono::{DateTime, Utc};

use crate::models::Transaction;

use super::action::ReviewAction;

/// Pre-mutation copies of every record a mutation touched
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    /// What the captured mutation did
    pub action: ReviewAction,
    /// Full prior records, in the order they were mutated
    pub records: Vec<Transaction>,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl UndoSnapshot {
    /// Human description, e.g. "Undo exclude (3 transactions)"
    pub fn describe(&self) -> String {
        match self.records.len() {
            1 => format!("Undo {} (1 transaction)", self.action),
            n => format!("Undo {} ({} transactions)", self.action, n),
        }
    }
}

/// Owner of the one pending undo snapshot
#[derive(Debug, Default)]
pub struct UndoManager {
    snapshot: Option<UndoSnapshot>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture prior records, discarding any earlier snapshot.
    ///
    /// An empty capture is ignored and leaves the existing snapshot alone;
    /// returns whether a snapshot was taken.
    pub fn snapshot(&mut self, action: ReviewAction, records: Vec<Transaction>) -> bool {
        if records.is_empty() {
            return false;
        }
        self.snapshot = Some(UndoSnapshot {
            action,
            records,
            taken_at: Utc::now(),
        });
        true
    }

    /// Remove and return the snapshot
    pub fn consume(&mut self) -> Option<UndoSnapshot> {
        self.snapshot.take()
    }

    pub fn can_undo(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn peek(&self) -> Option<&UndoSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn record(description: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            Money::from_cents(-100),
            description,
        )
    }

    #[test]
    fn test_starts_empty() {
        let mut undo = UndoManager::new();
        assert!(!undo.can_undo());
        assert!(undo.consume().is_none());
    }

    #[test]
    fn test_snapshot_then_consume_once() {
        let mut undo = UndoManager::new();
        let before = record("Coffee");
        assert!(undo.snapshot(ReviewAction::Skip, vec![before.clone()]));
        assert!(undo.can_undo());

        let snapshot = undo.consume().unwrap();
        assert_eq!(snapshot.action, ReviewAction::Skip);
        assert_eq!(snapshot.records, vec![before]);
        assert!(!undo.can_undo());
        assert!(undo.consume().is_none());
    }

    #[test]
    fn test_new_snapshot_replaces_previous() {
        let mut undo = UndoManager::new();
        undo.snapshot(ReviewAction::Skip, vec![record("first")]);
        undo.snapshot(
            ReviewAction::Exclude,
            vec![record("second"), record("third")],
        );

        let snapshot = undo.consume().unwrap();
        assert_eq!(snapshot.action, ReviewAction::Exclude);
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].description, "second");
    }

    #[test]
    fn test_empty_capture_keeps_existing_snapshot() {
        let mut undo = UndoManager::new();
        undo.snapshot(ReviewAction::Skip, vec![record("kept")]);
        assert!(!undo.snapshot(ReviewAction::Exclude, Vec::new()));
        assert_eq!(undo.peek().unwrap().action, ReviewAction::Skip);
    }

    #[test]
    fn test_describe() {
        let mut undo = UndoManager::new();
        undo.snapshot(ReviewAction::MarkBusiness, vec![record("a"), record("b")]);
        assert_eq!(
            undo.peek().unwrap().describe(),
            "Undo mark business (2 transactions)"
        );
        undo.snapshot(ReviewAction::Exclude, vec![record("a")]);
        assert_eq!(undo.peek().unwrap().describe(), "Undo exclude (1 transaction)");
        undo.clear();
        assert!(!undo.can_undo());
    }
}
