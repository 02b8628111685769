//! Core data models for txn-review
//!
//! This module contains the data structures of the review domain: transaction
//! identity, exact money amounts, and the transaction record with its review status.

pub mod ids;
pub mod money;
pub mod transaction;

pub use ids::TransactionId;
pub use money::{Money, MoneyParseError};
pub use transaction::{ReviewStatus, Transaction, TransactionValidationError};
