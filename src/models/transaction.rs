//! Transaction model
//!
//! Represents an imported bank transaction together with its review state:
//! pending, excluded from the tax calculation (with a reason), or skipped.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;
use super::money::Money;

/// Review status of a transaction
///
/// `Pending` is initial. The only forward transitions are
/// `Pending -> Excluded` and `Pending -> Skipped`; going back to `Pending`
/// happens exclusively by restoring an earlier record (undo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Not yet reviewed
    #[default]
    Pending,
    /// Removed from the tax calculation
    Excluded,
    /// Looked at and deliberately left as is
    Skipped,
}

impl ReviewStatus {
    /// Check whether a review action may move a record from `self` to `next`
    pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Excluded) | (Self::Pending, Self::Skipped)
        )
    }

    /// Parse a status from user input (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "excluded" => Some(Self::Excluded),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Excluded => write!(f, "excluded"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// An imported bank transaction under review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Booking date
    pub date: NaiveDate,

    /// Amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// Bank statement description
    #[serde(default)]
    pub description: String,

    /// Optional category label
    #[serde(default)]
    pub category: Option<String>,

    /// Review status
    #[serde(default)]
    pub status: ReviewStatus,

    /// Business (`Some(true)`) or personal (`Some(false)`); `None` when unclassified
    #[serde(default)]
    pub is_business: Option<bool>,

    /// Why the transaction was excluded; set only while status is `Excluded`
    #[serde(default)]
    pub exclusion_reason: Option<String>,

    /// When the transaction was excluded
    #[serde(default)]
    pub excluded_at: Option<DateTime<Utc>>,

    /// Import ID for duplicate detection during CSV import
    #[serde(default)]
    pub import_id: Option<String>,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new pending transaction
    pub fn new(date: NaiveDate, amount: Money, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            date,
            amount,
            description: description.into(),
            category: None,
            status: ReviewStatus::Pending,
            is_business: None,
            exclusion_reason: None,
            excluded_at: None,
            import_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this transaction still awaits review
    pub fn is_pending(&self) -> bool {
        self.status == ReviewStatus::Pending
    }

    /// Mark as excluded with a reason
    pub fn exclude(
        &mut self,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<(), TransactionValidationError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(TransactionValidationError::BlankExclusionReason);
        }
        self.transition(ReviewStatus::Excluded)?;
        self.exclusion_reason = Some(reason.trim().to_string());
        self.excluded_at = Some(at);
        Ok(())
    }

    /// Mark as skipped
    pub fn skip(&mut self) -> Result<(), TransactionValidationError> {
        self.transition(ReviewStatus::Skipped)
    }

    /// Classify as business (`true`) or personal (`false`)
    ///
    /// Never touches the review status.
    pub fn set_business(&mut self, is_business: bool) {
        self.is_business = Some(is_business);
        self.updated_at = Utc::now();
    }

    fn transition(&mut self, next: ReviewStatus) -> Result<(), TransactionValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(TransactionValidationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate the record's internal consistency
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        match (self.status, &self.exclusion_reason) {
            (ReviewStatus::Excluded, None) => {
                Err(TransactionValidationError::BlankExclusionReason)
            }
            (ReviewStatus::Excluded, Some(reason)) if reason.trim().is_empty() => {
                Err(TransactionValidationError::BlankExclusionReason)
            }
            (ReviewStatus::Pending | ReviewStatus::Skipped, Some(_)) => {
                Err(TransactionValidationError::ReasonWithoutExclusion)
            }
            _ => Ok(()),
        }
    }

    /// Generate an import ID for duplicate detection
    ///
    /// `occurrence` counts earlier rows in the same statement with the same
    /// date, amount and description, so two identical purchases on one day
    /// keep distinct ids. The id is plain text and stays stable across
    /// builds and platforms.
    pub fn generate_import_id(
        date: NaiveDate,
        amount: Money,
        description: &str,
        occurrence: usize,
    ) -> String {
        format!(
            "imp-{}/{}/{}/{}",
            date.format("%Y-%m-%d"),
            amount.cents(),
            occurrence,
            description.trim()
        )
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    BlankExclusionReason,
    ReasonWithoutExclusion,
    InvalidTransition { from: ReviewStatus, to: ReviewStatus },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankExclusionReason => write!(f, "Exclusion reason must not be blank"),
            Self::ReasonWithoutExclusion => {
                write!(f, "Only excluded transactions may carry an exclusion reason")
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "Cannot change review status from {} to {}", from, to)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
