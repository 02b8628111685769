//! Transaction store backed by a JSON file
//!
//! Keeps every transaction in memory and writes the whole file atomically
//! after each mutation, so the file on disk always matches what callers saw.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::error::{ReviewError, ReviewResult};
use crate::models::{Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::TransactionStore;

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// JSON file implementation of [`TransactionStore`]
pub struct JsonTransactionStore {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: import_id -> transaction_id
    by_import_id: RwLock<HashMap<String, TransactionId>>,
}

impl JsonTransactionStore {
    /// Create a new, empty store for the given file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_import_id: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store and load its file
    pub fn open(path: PathBuf) -> ReviewResult<Self> {
        let store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_data(&self) -> ReviewResult<RwLockReadGuard<'_, HashMap<TransactionId, Transaction>>> {
        self.data
            .read()
            .map_err(|e| ReviewError::Store(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_data(
        &self,
    ) -> ReviewResult<RwLockWriteGuard<'_, HashMap<TransactionId, Transaction>>> {
        self.data
            .write()
            .map_err(|e| ReviewError::Store(format!("Failed to acquire write lock: {}", e)))
    }

    fn write_index(&self) -> ReviewResult<RwLockWriteGuard<'_, HashMap<String, TransactionId>>> {
        self.by_import_id
            .write()
            .map_err(|e| ReviewError::Store(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load transactions from disk and build the import index
    pub fn load(&self) -> ReviewResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.write_data()?;
        let mut by_import_id = self.write_index()?;

        data.clear();
        by_import_id.clear();

        for txn in file_data.transactions {
            if let Some(import_id) = &txn.import_id {
                by_import_id.insert(import_id.clone(), txn.id);
            }
            data.insert(txn.id, txn);
        }

        tracing::debug!(count = data.len(), path = %self.path.display(), "loaded transactions");
        Ok(())
    }

    /// Write the current contents to disk
    fn flush(&self, data: &HashMap<TransactionId, Transaction>) -> ReviewResult<()> {
        let transactions = sorted(data.values().cloned().collect());
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Insert or replace one record and persist, rolling back memory if the write fails
    fn upsert(&self, txn: Transaction) -> ReviewResult<Transaction> {
        let mut data = self.write_data()?;
        let previous = data.insert(txn.id, txn.clone());

        if let Err(e) = self.flush(&data) {
            match previous {
                Some(old) => data.insert(old.id, old),
                None => data.remove(&txn.id),
            };
            return Err(e);
        }
        drop(data);

        if let Some(import_id) = &txn.import_id {
            self.write_index()?.insert(import_id.clone(), txn.id);
        }
        Ok(txn)
    }

    /// Read a record, apply a change to a copy, and persist it
    fn modify<F>(&self, id: TransactionId, change: F) -> ReviewResult<Transaction>
    where
        F: FnOnce(&mut Transaction) -> ReviewResult<()>,
    {
        let mut txn = self
            .find_by_id(id)?
            .ok_or_else(|| ReviewError::transaction_not_found(id.to_string()))?;
        change(&mut txn)?;
        self.upsert(txn)
    }

    /// Insert many new transactions with a single write
    ///
    /// Records whose import ID is already known are skipped. Returns the
    /// records actually inserted.
    pub fn insert_many(&self, transactions: Vec<Transaction>) -> ReviewResult<Vec<Transaction>> {
        let mut data = self.write_data()?;
        let mut by_import_id = self.write_index()?;

        let mut seen = HashSet::new();
        let mut inserted = Vec::new();
        for txn in transactions {
            if let Some(import_id) = &txn.import_id {
                if by_import_id.contains_key(import_id) || !seen.insert(import_id.clone()) {
                    continue;
                }
            }
            inserted.push(txn);
        }

        if inserted.is_empty() {
            return Ok(inserted);
        }

        for txn in &inserted {
            data.insert(txn.id, txn.clone());
        }

        if let Err(e) = self.flush(&data) {
            for txn in &inserted {
                data.remove(&txn.id);
            }
            return Err(e);
        }

        for txn in &inserted {
            if let Some(import_id) = &txn.import_id {
                by_import_id.insert(import_id.clone(), txn.id);
            }
        }
        Ok(inserted)
    }

    /// Count transactions
    pub fn count(&self) -> ReviewResult<usize> {
        Ok(self.read_data()?.len())
    }
}

impl TransactionStore for JsonTransactionStore {
    fn save(&self, txn: Transaction) -> ReviewResult<Transaction> {
        txn.validate()
            .map_err(|e| ReviewError::Validation(e.to_string()))?;
        self.upsert(txn)
    }

    fn find_by_id(&self, id: TransactionId) -> ReviewResult<Option<Transaction>> {
        Ok(self.read_data()?.get(&id).cloned())
    }

    fn find_all(&self) -> ReviewResult<Vec<Transaction>> {
        Ok(sorted(self.read_data()?.values().cloned().collect()))
    }

    fn exclude(
        &self,
        id: TransactionId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> ReviewResult<Transaction> {
        self.modify(id, |txn| {
            txn.exclude(reason, at)
                .map_err(|e| ReviewError::Validation(e.to_string()))
        })
    }

    fn mark_business(&self, id: TransactionId, is_business: bool) -> ReviewResult<Transaction> {
        self.modify(id, |txn| {
            txn.set_business(is_business);
            Ok(())
        })
    }
}

/// Newest first; ties broken by creation time, then id, so order is stable across loads
fn sorted(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(a.id.cmp(&b.id))
    });
    transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ReviewStatus};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, JsonTransactionStore) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let store = JsonTransactionStore::open(path).unwrap();
        (temp_dir, store)
    }

    fn txn(day: u32, cents: i64, description: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            Money::from_cents(cents),
            description,
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, store) = create_test_store();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_find() {
        let (_temp_dir, store) = create_test_store();
        let t = txn(15, -5000, "Coffee");
        let id = t.id;

        store.save(t).unwrap();

        let retrieved = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(retrieved.amount.cents(), -5000);
        assert!(store.find_by_id(TransactionId::new()).unwrap().is_none());
    }

    #[test]
    fn test_save_rejects_inconsistent_record() {
        let (_temp_dir, store) = create_test_store();
        let mut t = txn(15, -5000, "Coffee");
        t.status = ReviewStatus::Excluded;

        let err = store.save(t).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_find_all_newest_first() {
        let (_temp_dir, store) = create_test_store();
        store.save(txn(10, -100, "old")).unwrap();
        store.save(txn(20, -300, "new")).unwrap();
        store.save(txn(15, -200, "mid")).unwrap();

        let all = store.find_all().unwrap();
        let descriptions: Vec<_> = all.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_writes_persist_across_reload() {
        let (temp_dir, store) = create_test_store();
        let t = txn(15, -5000, "Transfer to savings");
        let id = t.id;
        store.save(t).unwrap();
        store.exclude(id, "Transfer", Utc::now()).unwrap();

        let reopened =
            JsonTransactionStore::open(temp_dir.path().join("transactions.json")).unwrap();
        let retrieved = reopened.find_by_id(id).unwrap().unwrap();
        assert_eq!(retrieved.status, ReviewStatus::Excluded);
        assert_eq!(retrieved.exclusion_reason.as_deref(), Some("Transfer"));
    }

    #[test]
    fn test_exclude_missing_and_invalid() {
        let (_temp_dir, store) = create_test_store();
        let err = store
            .exclude(TransactionId::new(), "Transfer", Utc::now())
            .unwrap_err();
        assert!(err.is_not_found());

        let t = txn(15, -5000, "Coffee");
        let id = t.id;
        store.save(t).unwrap();
        assert!(store.exclude(id, " ", Utc::now()).unwrap_err().is_validation());
    }

    #[test]
    fn test_mark_business() {
        let (_temp_dir, store) = create_test_store();
        let t = txn(15, -5000, "Printer paper");
        let id = t.id;
        store.save(t).unwrap();

        let updated = store.mark_business(id, true).unwrap();
        assert_eq!(updated.is_business, Some(true));
        assert_eq!(updated.status, ReviewStatus::Pending);
        assert_eq!(store.find_by_id(id).unwrap().unwrap().is_business, Some(true));
    }

    #[test]
    fn test_insert_many_skips_known_import_ids() {
        let (_temp_dir, store) = create_test_store();
        let mut a = txn(15, -5000, "Coffee");
        a.import_id = Some("imp-a".into());
        let mut b = txn(16, -700, "Bus");
        b.import_id = Some("imp-b".into());

        let inserted = store.insert_many(vec![a.clone(), b]).unwrap();
        assert_eq!(inserted.len(), 2);

        let mut again = txn(15, -5000, "Coffee");
        again.import_id = Some("imp-a".into());
        let inserted = store.insert_many(vec![again]).unwrap();
        assert!(inserted.is_empty());

        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.find_by_id(a.id).unwrap().unwrap().description, "Coffee");
    }
}
