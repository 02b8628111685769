//! Record store adapter
//!
//! Thin synchronous facade over the persistence collaborator. Every call
//! returns the record as persisted or the collaborator's error unchanged;
//! the engine never retries.

use chrono::{DateTime, Utc};

use crate::error::{ReviewError, ReviewResult};
use crate::models::{Transaction, TransactionId};
use crate::storage::TransactionStore;

/// Adapter the review engine uses for every read and write
pub struct RecordStore<S> {
    store: S,
}

impl<S: TransactionStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped collaborator
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Every record in scope, in store order
    pub fn load_all(&self) -> ReviewResult<Vec<Transaction>> {
        self.store.find_all()
    }

    pub fn exclude(
        &self,
        id: TransactionId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> ReviewResult<Transaction> {
        let stored = self.store.exclude(id, reason, at)?;
        check_identity(id, stored)
    }

    /// Persist `current` with status Skipped
    pub fn skip(&self, current: &Transaction) -> ReviewResult<Transaction> {
        let mut next = current.clone();
        next.skip()
            .map_err(|e| ReviewError::Validation(e.to_string()))?;
        let stored = self.store.save(next)?;
        check_identity(current.id, stored)
    }

    pub fn set_business(&self, id: TransactionId, is_business: bool) -> ReviewResult<Transaction> {
        let stored = self.store.mark_business(id, is_business)?;
        check_identity(id, stored)
    }

    /// Write a previously captured record back verbatim
    pub fn restore(&self, prior: Transaction) -> ReviewResult<Transaction> {
        let id = prior.id;
        let stored = self.store.save(prior)?;
        check_identity(id, stored)
    }
}

fn check_identity(requested: TransactionId, stored: Transaction) -> ReviewResult<Transaction> {
    if stored.id != requested {
        return Err(ReviewError::Store(format!(
            "Store returned {} when writing {}",
            stored.id, requested
        )));
    }
    Ok(stored)
}
