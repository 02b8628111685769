//! Display formatting for terminal output
//!
//! Plain-text registers, detail blocks and review progress summaries.

pub mod review;
pub mod transaction;

pub use review::{format_review_summary, format_view_footer};
pub use transaction::{
    format_transaction_details, format_transaction_register, format_transaction_row,
    DisplayOptions,
};
