//! Sort comparators for the filtered view
//!
//! Sorting is stable: records with equal keys keep their working-set order,
//! which makes re-sorting an already sorted view a no-op.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Field a view can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    /// Signed amount, so outflows sort below inflows
    Amount,
    /// Case-sensitive lexical order
    Description,
}

impl SortField {
    /// Parse a field name from user input (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Some(Self::Date),
            "amount" => Some(Self::Amount),
            "description" | "desc" => Some(Self::Description),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Amount => write!(f, "amount"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// Sort field plus direction; defaults to date descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub ascending: bool,
}

impl SortSpec {
    pub fn new(field: SortField, ascending: bool) -> Self {
        Self { field, ascending }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Date,
            ascending: false,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "ascending" } else { "descending" };
        write!(f, "{} {}", self.field, direction)
    }
}

/// Compare two transactions under a sort spec
pub fn compare(a: &Transaction, b: &Transaction, spec: &SortSpec) -> Ordering {
    let natural = match spec.field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Amount => a.amount.cmp(&b.amount),
        SortField::Description => a.description.cmp(&b.description),
    };

    if spec.ascending {
        natural
    } else {
        natural.reverse()
    }
}

/// Stable-sort a list of references into the working set
pub fn sort_transactions(items: &mut [&Transaction], spec: &SortSpec) {
    items.sort_by(|a, b| compare(a, b, spec));
}
