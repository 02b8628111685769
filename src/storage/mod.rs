//! Storage layer for txn-review
//!
//! Defines the persistence collaborator the review engine talks to and
//! provides a JSON file implementation with atomic writes.

pub mod file_io;
pub mod transactions;

pub use file_io::{read_json, write_json_atomic};
pub use transactions::JsonTransactionStore;

use chrono::{DateTime, Utc};

use crate::config::paths::ReviewPaths;
use crate::error::ReviewResult;
use crate::models::{Transaction, TransactionId};

/// Persistence collaborator holding the authoritative transaction records
///
/// Every call is synchronous and returns the record as stored after the
/// write, or fails with a [`crate::error::ReviewError`]. Implementations own
/// their own retry and timeout policy.
pub trait TransactionStore {
    /// Store a full record, replacing any record with the same id
    fn save(&self, txn: Transaction) -> ReviewResult<Transaction>;

    /// Look up one record
    fn find_by_id(&self, id: TransactionId) -> ReviewResult<Option<Transaction>>;

    /// Every record in the active scope
    fn find_all(&self) -> ReviewResult<Vec<Transaction>>;

    /// Mark a record excluded with a reason and timestamp
    fn exclude(
        &self,
        id: TransactionId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> ReviewResult<Transaction>;

    /// Mark a record business (`true`) or personal (`false`)
    fn mark_business(&self, id: TransactionId, is_business: bool) -> ReviewResult<Transaction>;
}

impl<S: TransactionStore + ?Sized> TransactionStore for &S {
    fn save(&self, txn: Transaction) -> ReviewResult<Transaction> {
        (**self).save(txn)
    }

    fn find_by_id(&self, id: TransactionId) -> ReviewResult<Option<Transaction>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> ReviewResult<Vec<Transaction>> {
        (**self).find_all()
    }

    fn exclude(
        &self,
        id: TransactionId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> ReviewResult<Transaction> {
        (**self).exclude(id, reason, at)
    }

    fn mark_business(&self, id: TransactionId, is_business: bool) -> ReviewResult<Transaction> {
        (**self).mark_business(id, is_business)
    }
}

/// Open the JSON store at its configured location, creating directories as needed
pub fn open_store(paths: &ReviewPaths) -> ReviewResult<JsonTransactionStore> {
    paths.ensure_directories()?;
    JsonTransactionStore::open(paths.transactions_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_store_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ReviewPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = open_store(&paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.path(), &paths.transactions_file());
    }
}
