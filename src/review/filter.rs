//! Filter predicates for the review working set
//!
//! Each predicate is a pure function of a transaction and one part of the
//! criteria. Active predicates are combined with logical AND.

use chrono::NaiveDate;

use crate::error::{ReviewError, ReviewResult};
use crate::models::{Money, ReviewStatus, Transaction};

/// Immutable filter criteria; an absent field imposes no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the description; blank matches everything
    pub search_text: Option<String>,
    /// Exact review status
    pub status: Option<ReviewStatus>,
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
    /// Inclusive lower bound on the absolute amount
    pub min_amount: Option<Money>,
    /// Inclusive upper bound on the absolute amount
    pub max_amount: Option<Money>,
}

impl FilterCriteria {
    /// Create criteria that match everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by description text
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Filter by status
    pub fn status(mut self, status: ReviewStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by date range (both ends inclusive)
    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Filter by minimum absolute amount
    pub fn min_amount(mut self, min: Money) -> Self {
        self.min_amount = Some(min);
        self
    }

    /// Filter by maximum absolute amount
    pub fn max_amount(mut self, max: Money) -> Self {
        self.max_amount = Some(max);
        self
    }

    /// Check that the bounds make sense
    pub fn validate(&self) -> ReviewResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ReviewError::Validation(format!(
                    "Date range start {} is after its end {}",
                    from, to
                )));
            }
        }

        for bound in [self.min_amount, self.max_amount].into_iter().flatten() {
            if bound.is_negative() {
                return Err(ReviewError::Validation(format!(
                    "Amount bounds apply to absolute values and cannot be negative: {}",
                    bound
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(ReviewError::Validation(format!(
                    "Minimum amount {} is greater than maximum amount {}",
                    min, max
                )));
            }
        }

        Ok(())
    }

    /// Whether any predicate is active
    pub fn is_active(&self) -> bool {
        self.search_needle().is_some()
            || self.status.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.min_amount.is_some()
            || self.max_amount.is_some()
    }

    /// Lower-cased search text, or `None` when blank.
    ///
    /// Surrounding spaces only decide blankness; a non-blank needle is
    /// matched exactly as typed, so `" tea"` does not match "Steam".
    fn search_needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_lowercase)
    }

    /// Check a transaction against every active predicate
    pub fn matches(&self, txn: &Transaction) -> bool {
        matches_search(txn, self.search_needle().as_deref())
            && matches_status(txn, self.status)
            && matches_date(txn, self.date_from, self.date_to)
            && matches_amount(txn, self.min_amount, self.max_amount)
    }
}

/// Case-insensitive substring match on the description. `needle` must already be lower-case.
pub fn matches_search(txn: &Transaction, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => txn.description.to_lowercase().contains(needle),
    }
}

pub fn matches_status(txn: &Transaction, status: Option<ReviewStatus>) -> bool {
    status.map_or(true, |s| txn.status == s)
}

pub fn matches_date(txn: &Transaction, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |from| txn.date >= from) && to.map_or(true, |to| txn.date <= to)
}

/// Bounds compare against `|amount|`, so a -20.00 debit passes a 15.00 minimum
pub fn matches_amount(txn: &Transaction, min: Option<Money>, max: Option<Money>) -> bool {
    let magnitude = txn.amount.magnitude();
    min.map_or(true, |min| magnitude >= min.magnitude())
        && max.map_or(true, |max| magnitude <= max.magnitude())
}
