//! Immutable read model handed to the presentation layer
//!
//! The engine recomputes its derived state after every operation; callers
//! take a fresh [`ReviewView`] when they want to render it.

use serde::Serialize;

use crate::models::{ReviewStatus, Transaction};

use super::sort::SortSpec;

/// Status counts over the whole working set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewCounts {
    pub total: usize,
    pub pending: usize,
    pub excluded: usize,
    pub skipped: usize,
}

impl ReviewCounts {
    /// Tally statuses
    pub fn tally<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .fold(Self::default(), |mut counts, txn| {
                counts.total += 1;
                match txn.status {
                    ReviewStatus::Pending => counts.pending += 1,
                    ReviewStatus::Excluded => counts.excluded += 1,
                    ReviewStatus::Skipped => counts.skipped += 1,
                }
                counts
            })
    }

    /// Everything that is no longer pending
    pub fn reviewed(&self) -> usize {
        self.total - self.pending
    }

    /// Reviewed share in `0.0..=1.0`; zero for an empty working set
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.reviewed() as f64 / self.total as f64
        }
    }
}

/// Snapshot of everything a screen needs to draw the review list
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    /// Records on the current page, in display order
    pub items: Vec<Transaction>,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub counts: ReviewCounts,
    /// Size of the filtered view
    pub filtered_count: usize,
    pub progress: f64,
    pub selected_count: usize,
    pub is_empty_state: bool,
    pub is_no_results: bool,
    pub result_text: String,
    pub sort: SortSpec,
    pub filter_active: bool,
    pub can_undo: bool,
    pub undo_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_tally_and_progress() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let mut excluded = Transaction::new(date, Money::from_cents(-1), "a");
        excluded.exclude("Transfer", Utc::now()).unwrap();
        let mut skipped = Transaction::new(date, Money::from_cents(-1), "b");
        skipped.skip().unwrap();
        let records = vec![
            excluded,
            skipped,
            Transaction::new(date, Money::from_cents(-1), "c"),
            Transaction::new(date, Money::from_cents(-1), "d"),
        ];

        let counts = ReviewCounts::tally(&records);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.excluded, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.reviewed(), 2);
        assert!((counts.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_progress_is_zero() {
        let counts = ReviewCounts::default();
        assert_eq!(counts.reviewed(), 0);
        assert_eq!(counts.progress(), 0.0);
    }
}
