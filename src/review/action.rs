//! Review actions a user can apply to transactions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mutating review action; recorded in undo snapshots and the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Excluded from the tax calculation
    Exclude,
    /// Skipped
    Skip,
    /// Classified as business
    MarkBusiness,
    /// Classified as personal
    MarkPersonal,
    /// Prior state written back by undo
    Restore,
}

impl ReviewAction {
    /// Business/personal classification for the flag value
    pub fn for_business_flag(is_business: bool) -> Self {
        if is_business {
            Self::MarkBusiness
        } else {
            Self::MarkPersonal
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::Skip => write!(f, "skip"),
            Self::MarkBusiness => write!(f, "mark business"),
            Self::MarkPersonal => write!(f, "mark personal"),
            Self::Restore => write!(f, "restore"),
        }
    }
}
