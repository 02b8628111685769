//! Multi-select state over the filtered view
//!
//! Only ids visible in the filtered view can be selected. After every
//! recomputation the engine calls [`Selection::retain_visible`], so ids that
//! a new filter hides are dropped rather than kept invisibly.

use std::collections::HashSet;

use crate::models::{Transaction, TransactionId};

/// Set of selected transaction ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<TransactionId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id; ids outside `visible` are ignored. Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: TransactionId, visible: &[&Transaction]) -> bool {
        if self.ids.remove(&id) {
            return false;
        }
        if visible.iter().any(|t| t.id == id) {
            self.ids.insert(id);
            return true;
        }
        false
    }

    /// Select every visible record
    pub fn select_all(&mut self, visible: &[&Transaction]) {
        self.ids.extend(visible.iter().map(|t| t.id));
    }

    /// Select every visible record that is still pending
    pub fn select_all_pending(&mut self, visible: &[&Transaction]) {
        self.ids
            .extend(visible.iter().filter(|t| t.is_pending()).map(|t| t.id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: TransactionId) -> bool {
        self.ids.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop ids that are no longer visible; returns how many were dropped
    pub fn retain_visible(&mut self, visible: &[&Transaction]) -> usize {
        if self.ids.is_empty() {
            return 0;
        }
        let visible: HashSet<TransactionId> = visible.iter().map(|t| t.id).collect();
        let before = self.ids.len();
        self.ids.retain(|id| visible.contains(id));
        before - self.ids.len()
    }

    /// Selected ids in the order they appear in `view`
    pub fn ordered_ids(&self, view: &[&Transaction]) -> Vec<TransactionId> {
        view.iter()
            .map(|t| t.id)
            .filter(|id| self.ids.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::{NaiveDate, Utc};

    fn records() -> Vec<Transaction> {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let mut excluded = Transaction::new(date, Money::from_cents(-300), "Transfer");
        excluded.exclude("Transfer", Utc::now()).unwrap();
        vec![
            Transaction::new(date, Money::from_cents(-100), "Coffee"),
            Transaction::new(date, Money::from_cents(-200), "Paper"),
            excluded,
        ]
    }

    #[test]
    fn test_toggle() {
        let records = records();
        let visible: Vec<&Transaction> = records.iter().collect();
        let mut selection = Selection::new();

        assert!(selection.toggle(records[0].id, &visible));
        assert!(selection.is_selected(records[0].id));
        assert_eq!(selection.count(), 1);

        assert!(!selection.toggle(records[0].id, &visible));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_invisible_id_is_noop() {
        let records = records();
        let visible: Vec<&Transaction> = records.iter().take(1).collect();
        let mut selection = Selection::new();

        assert!(!selection.toggle(records[1].id, &visible));
        assert!(!selection.toggle(TransactionId::new(), &visible));
        assert_eq!(selection.count(), 0);
    }

    #[test]
    fn test_select_all_and_pending() {
        let records = records();
        let visible: Vec<&Transaction> = records.iter().collect();
        let mut selection = Selection::new();

        selection.select_all_pending(&visible);
        assert_eq!(selection.count(), 2);
        assert!(!selection.is_selected(records[2].id));

        selection.select_all(&visible);
        assert_eq!(selection.count(), 3);

        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_visible_drops_hidden_ids() {
        let records = records();
        let all: Vec<&Transaction> = records.iter().collect();
        let mut selection = Selection::new();
        selection.select_all(&all);

        let narrowed: Vec<&Transaction> = records.iter().skip(1).collect();
        assert_eq!(selection.retain_visible(&narrowed), 1);
        assert!(!selection.is_selected(records[0].id));
        assert_eq!(selection.count(), 2);
    }

    #[test]
    fn test_ordered_ids_follow_view_order() {
        let records = records();
        let mut view: Vec<&Transaction> = records.iter().collect();
        let mut selection = Selection::new();
        selection.toggle(records[0].id, &view);
        selection.toggle(records[2].id, &view);

        view.reverse();
        assert_eq!(
            selection.ordered_ids(&view),
            vec![records[2].id, records[0].id]
        );
    }
}
