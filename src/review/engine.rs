//! Review engine
//!
//! Owns the working set of transactions for one review session and keeps
//! the derived state consistent with it: the filtered view, its sorted
//! order, the page window and the selection. Every operation that changes
//! the working set or the criteria re-derives all of them before returning.
//!
//! Mutations are written through the [`RecordStore`] first; the working set
//! only reflects a change once the store has accepted it.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::Settings;
use crate::error::{ReviewError, ReviewResult};
use crate::export::{export_to_file, ExportFormat};
use crate::models::{Money, ReviewStatus, Transaction, TransactionId};
use crate::storage::TransactionStore;

use super::action::ReviewAction;
use super::filter::FilterCriteria;
use super::pagination::Pagination;
use super::records::RecordStore;
use super::selection::Selection;
use super::sort::{sort_transactions, SortSpec};
use super::undo::UndoManager;
use super::view::{ReviewCounts, ReviewView};

/// Orchestrates filtering, sorting, paging, selection, mutations and undo
pub struct ReviewEngine<S> {
    records: RecordStore<S>,
    working_set: Vec<Transaction>,
    index: HashMap<TransactionId, usize>,
    criteria: FilterCriteria,
    sort: SortSpec,
    pagination: Pagination,
    selection: Selection,
    undo: UndoManager,
    audit: Option<AuditLogger>,
    /// Working-set positions that pass the filter, in working-set order
    filtered: Vec<usize>,
    /// The same positions in display order
    sorted: Vec<usize>,
}

impl<S: TransactionStore> ReviewEngine<S> {
    /// Create an empty engine; call [`ReviewEngine::load`] to fill it
    pub fn new(store: S, page_size: usize) -> Self {
        Self {
            records: RecordStore::new(store),
            working_set: Vec::new(),
            index: HashMap::new(),
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            pagination: Pagination::new(page_size),
            selection: Selection::new(),
            undo: UndoManager::new(),
            audit: None,
            filtered: Vec::new(),
            sorted: Vec::new(),
        }
    }

    /// Create an engine using the page size and initial sort from settings
    pub fn from_settings(store: S, settings: &Settings) -> Self {
        let mut engine = Self::new(store, settings.page_size);
        engine.sort = settings.default_sort;
        engine
    }

    /// Record every committed mutation in an audit log
    pub fn with_audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    /// The persistence collaborator
    pub fn store(&self) -> &S {
        self.records.inner()
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replace the working set with every record from the store.
    ///
    /// Resets selection, pagination and undo. On a store failure the engine
    /// keeps its previous state.
    pub fn load(&mut self) -> ReviewResult<()> {
        let transactions = self.records.load_all()?;

        self.index = transactions
            .iter()
            .enumerate()
            .map(|(pos, txn)| (txn.id, pos))
            .collect();
        self.working_set = transactions;
        self.selection.clear();
        self.pagination.reset();
        self.undo.clear();
        self.recompute();

        info!(count = self.working_set.len(), "Loaded working set");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Filter and sort
    // ------------------------------------------------------------------

    /// Replace the filter criteria. Invalid criteria are rejected and leave
    /// the current view untouched.
    pub fn set_filter(&mut self, criteria: FilterCriteria) -> ReviewResult<()> {
        criteria.validate()?;
        self.criteria = criteria;
        self.pagination.reset();
        self.recompute();
        Ok(())
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> ReviewResult<()> {
        let text = text.into();
        let criteria = FilterCriteria {
            search_text: if text.trim().is_empty() { None } else { Some(text) },
            ..self.criteria.clone()
        };
        self.set_filter(criteria)
    }

    pub fn set_status_filter(&mut self, status: Option<ReviewStatus>) -> ReviewResult<()> {
        let criteria = FilterCriteria {
            status,
            ..self.criteria.clone()
        };
        self.set_filter(criteria)
    }

    /// Set or clear the inclusive date bounds
    pub fn set_date_range(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ReviewResult<()> {
        let criteria = FilterCriteria {
            date_from: from,
            date_to: to,
            ..self.criteria.clone()
        };
        self.set_filter(criteria)
    }

    /// Set or clear the inclusive bounds on the absolute amount
    pub fn set_amount_range(&mut self, min: Option<Money>, max: Option<Money>) -> ReviewResult<()> {
        let criteria = FilterCriteria {
            min_amount: min,
            max_amount: max,
            ..self.criteria.clone()
        };
        self.set_filter(criteria)
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.pagination.reset();
        self.recompute();
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Change the display order. Selection is kept.
    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
        self.pagination.reset();
        self.recompute();
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    // ------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------

    pub fn next_page(&mut self) -> bool {
        self.pagination.next(self.sorted.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.pagination.previous()
    }

    /// Jump to a page; out of range lands on the last page
    pub fn go_to_page(&mut self, page_index: usize) {
        self.pagination.go_to(page_index, self.sorted.len());
    }

    pub fn page_index(&self) -> usize {
        self.pagination.page_index()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.sorted.len())
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }

    pub fn can_go_next(&self) -> bool {
        self.pagination.can_go_next(self.sorted.len())
    }

    pub fn can_go_previous(&self) -> bool {
        self.pagination.can_go_previous()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Toggle one record; records outside the filtered view are ignored
    pub fn toggle_selection(&mut self, id: TransactionId) -> bool {
        let visible = positions_to_refs(&self.working_set, &self.filtered);
        self.selection.toggle(id, &visible)
    }

    pub fn select_all(&mut self) {
        let visible = positions_to_refs(&self.working_set, &self.filtered);
        self.selection.select_all(&visible);
    }

    pub fn select_all_pending(&mut self) {
        let visible = positions_to_refs(&self.working_set, &self.filtered);
        self.selection.select_all_pending(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: TransactionId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.count()
    }

    /// Selected ids in display order
    pub fn selected_ids(&self) -> Vec<TransactionId> {
        self.selection.ordered_ids(&self.sorted_items())
    }

    // ------------------------------------------------------------------
    // Individual mutations
    // ------------------------------------------------------------------

    /// Exclude one record with a mandatory reason
    pub fn exclude(&mut self, id: TransactionId, reason: &str) -> ReviewResult<Transaction> {
        let reason = validate_reason(reason)?;
        let before = self.current(id)?.clone();
        ensure_transition(&before, ReviewStatus::Excluded, ReviewAction::Exclude)?;

        let after = self.records.exclude(id, reason, Utc::now())?;
        self.commit(ReviewAction::Exclude, vec![(before, after.clone())]);
        Ok(after)
    }

    /// Mark one record skipped
    pub fn skip(&mut self, id: TransactionId) -> ReviewResult<Transaction> {
        let before = self.current(id)?.clone();
        ensure_transition(&before, ReviewStatus::Skipped, ReviewAction::Skip)?;

        let after = self.records.skip(&before)?;
        self.commit(ReviewAction::Skip, vec![(before, after.clone())]);
        Ok(after)
    }

    /// Classify one record as business or personal; the status is unchanged
    pub fn set_business_flag(
        &mut self,
        id: TransactionId,
        is_business: bool,
    ) -> ReviewResult<Transaction> {
        let before = self.current(id)?.clone();

        let after = self.records.set_business(id, is_business)?;
        self.commit(
            ReviewAction::for_business_flag(is_business),
            vec![(before, after.clone())],
        );
        Ok(after)
    }

    // ------------------------------------------------------------------
    // Batch mutations
    // ------------------------------------------------------------------

    /// Flag every selected record as business. Returns how many were written.
    pub fn batch_mark_business(&mut self) -> ReviewResult<usize> {
        self.batch_flag(true)
    }

    /// Flag every selected record as personal. Returns how many were written.
    pub fn batch_mark_personal(&mut self) -> ReviewResult<usize> {
        self.batch_flag(false)
    }

    fn batch_flag(&mut self, is_business: bool) -> ReviewResult<usize> {
        let targets = self.selected_ids();
        self.apply_batch(
            ReviewAction::for_business_flag(is_business),
            targets,
            |records, txn| records.set_business(txn.id, is_business),
        )
    }

    /// Exclude every selected pending record with one reason.
    ///
    /// Selected records that are already excluded or skipped are left alone.
    pub fn batch_exclude(&mut self, reason: &str) -> ReviewResult<usize> {
        let reason = validate_reason(reason)?;
        let at = Utc::now();
        let targets: Vec<TransactionId> = self
            .selected_ids()
            .into_iter()
            .filter(|id| self.find(*id).is_some_and(Transaction::is_pending))
            .collect();

        self.apply_batch(ReviewAction::Exclude, targets, |records, txn| {
            records.exclude(txn.id, reason, at)
        })
    }

    /// Write `targets` one at a time.
    ///
    /// Stops at the first failure: the records already written are kept,
    /// snapshotted and audited, the selection survives, and the error is
    /// returned. On success the selection is cleared.
    fn apply_batch<F>(
        &mut self,
        action: ReviewAction,
        targets: Vec<TransactionId>,
        write: F,
    ) -> ReviewResult<usize>
    where
        F: Fn(&RecordStore<S>, &Transaction) -> ReviewResult<Transaction>,
    {
        if targets.is_empty() {
            debug!(%action, "Batch over empty selection, nothing to do");
            return Ok(0);
        }

        let requested = targets.len();
        let mut changes = Vec::with_capacity(requested);
        let mut failure = None;

        for id in targets {
            let before = match self.current(id) {
                Ok(txn) => txn.clone(),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            match write(&self.records, &before) {
                Ok(after) => changes.push((before, after)),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let written = changes.len();
        if let Some(err) = failure {
            warn!(%action, written, requested, error = %err, "Batch stopped after store failure");
            if written > 0 {
                self.commit(action, changes);
            }
            return Err(err);
        }

        self.selection.clear();
        self.commit(action, changes);
        Ok(written)
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Write back the records captured before the last mutation.
    ///
    /// Returns the restored records; an empty list when there was nothing to
    /// undo. The snapshot is consumed even if a restore fails.
    pub fn undo(&mut self) -> ReviewResult<Vec<Transaction>> {
        let Some(snapshot) = self.undo.consume() else {
            debug!("Nothing to undo");
            return Ok(Vec::new());
        };

        let mut restored = Vec::with_capacity(snapshot.records.len());
        let mut entries = Vec::with_capacity(snapshot.records.len());
        let mut failure = None;

        for prior in snapshot.records {
            let current = self.find(prior.id).cloned();
            match self.records.restore(prior) {
                Ok(stored) => {
                    if let Some(current) = current {
                        entries.push(AuditEntry::record(ReviewAction::Restore, &current, &stored));
                    }
                    self.replace(stored.clone());
                    restored.push(stored);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        self.write_audit(&entries);
        self.recompute();

        if let Some(err) = failure {
            warn!(
                action = %snapshot.action,
                restored = restored.len(),
                error = %err,
                "Undo aborted after store failure"
            );
            return Err(err);
        }

        info!(action = %snapshot.action, count = restored.len(), "Undid last action");
        Ok(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// e.g. "Undo exclude (3 transactions)"
    pub fn undo_description(&self) -> Option<String> {
        self.undo.peek().map(|snapshot| snapshot.describe())
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Write the whole filtered view (every page) as CSV, in display order
    pub fn export_csv(&self, path: &Path) -> ReviewResult<usize> {
        export_to_file(path, ExportFormat::Csv, &self.sorted_items())
    }

    /// Write the whole filtered view (every page) as a JSON array, in display order
    pub fn export_json(&self, path: &Path) -> ReviewResult<usize> {
        export_to_file(path, ExportFormat::Json, &self.sorted_items())
    }

    // ------------------------------------------------------------------
    // Read model
    // ------------------------------------------------------------------

    /// The working set in store order
    pub fn all_items(&self) -> &[Transaction] {
        &self.working_set
    }

    /// Filtered view in working-set order
    pub fn filtered_items(&self) -> Vec<&Transaction> {
        positions_to_refs(&self.working_set, &self.filtered)
    }

    /// Filtered view in display order
    pub fn sorted_items(&self) -> Vec<&Transaction> {
        positions_to_refs(&self.working_set, &self.sorted)
    }

    /// Records on the current page, in display order
    pub fn current_page_items(&self) -> Vec<&Transaction> {
        positions_to_refs(&self.working_set, self.pagination.page(&self.sorted))
    }

    pub fn find(&self, id: TransactionId) -> Option<&Transaction> {
        self.index.get(&id).map(|&pos| &self.working_set[pos])
    }

    /// Resolve a full id or a displayed `txn-xxxxxxxx` prefix against the working set
    pub fn resolve_reference(&self, reference: &str) -> ReviewResult<TransactionId> {
        let mut matches = self
            .working_set
            .iter()
            .filter(|txn| txn.id.matches_reference(reference));

        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(txn.id),
            (None, _) => Err(ReviewError::transaction_not_found(reference)),
            (Some(_), Some(_)) => Err(ReviewError::Validation(format!(
                "Transaction reference '{}' is ambiguous",
                reference
            ))),
        }
    }

    pub fn counts(&self) -> ReviewCounts {
        ReviewCounts::tally(&self.working_set)
    }

    pub fn total_count(&self) -> usize {
        self.working_set.len()
    }

    pub fn pending_count(&self) -> usize {
        self.counts().pending
    }

    pub fn excluded_count(&self) -> usize {
        self.counts().excluded
    }

    pub fn skipped_count(&self) -> usize {
        self.counts().skipped
    }

    /// Records no longer pending
    pub fn reviewed_count(&self) -> usize {
        self.counts().reviewed()
    }

    /// Reviewed share of the working set; zero when it is empty
    pub fn review_progress(&self) -> f64 {
        self.counts().progress()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// Nothing loaded at all
    pub fn is_empty_state(&self) -> bool {
        self.working_set.is_empty()
    }

    /// Records are loaded but the filter hides all of them
    pub fn is_no_results(&self) -> bool {
        !self.working_set.is_empty() && self.filtered.is_empty()
    }

    /// "Showing 21-25 of 25 entries", or "Showing 0 entries"
    pub fn result_count_text(&self) -> String {
        let total = self.sorted.len();
        if total == 0 {
            return "Showing 0 entries".to_string();
        }
        let bounds = self.pagination.bounds(total);
        format!(
            "Showing {}-{} of {} entries",
            bounds.start + 1,
            bounds.end,
            total
        )
    }

    /// Owned snapshot of the derived state
    pub fn view(&self) -> ReviewView {
        let counts = self.counts();
        ReviewView {
            items: self.current_page_items().into_iter().cloned().collect(),
            page_index: self.page_index(),
            page_count: self.page_count(),
            page_size: self.page_size(),
            can_go_next: self.can_go_next(),
            can_go_previous: self.can_go_previous(),
            counts,
            filtered_count: self.filtered.len(),
            progress: counts.progress(),
            selected_count: self.selection.count(),
            is_empty_state: self.is_empty_state(),
            is_no_results: self.is_no_results(),
            result_text: self.result_count_text(),
            sort: self.sort,
            filter_active: self.criteria.is_active(),
            can_undo: self.can_undo(),
            undo_description: self.undo_description(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn current(&self, id: TransactionId) -> ReviewResult<&Transaction> {
        self.find(id)
            .ok_or_else(|| ReviewError::transaction_not_found(id.to_string()))
    }

    /// Put a stored record into the working set
    fn replace(&mut self, txn: Transaction) {
        match self.index.get(&txn.id) {
            Some(&pos) => self.working_set[pos] = txn,
            None => {
                self.index.insert(txn.id, self.working_set.len());
                self.working_set.push(txn);
            }
        }
    }

    /// Apply written records, take the undo snapshot, audit, re-derive views
    fn commit(&mut self, action: ReviewAction, changes: Vec<(Transaction, Transaction)>) {
        let entries: Vec<AuditEntry> = changes
            .iter()
            .map(|(before, after)| AuditEntry::record(action, before, after))
            .collect();

        let mut priors = Vec::with_capacity(changes.len());
        for (before, after) in changes {
            self.replace(after);
            priors.push(before);
        }

        let count = priors.len();
        self.undo.snapshot(action, priors);
        self.write_audit(&entries);
        self.recompute();

        info!(%action, count, "Committed review action");
    }

    fn write_audit(&self, entries: &[AuditEntry]) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log_batch(entries) {
                warn!(error = %e, "Failed to write audit entries");
            }
        }
    }

    /// Filter, sort, re-validate selection, clamp the page window
    fn recompute(&mut self) {
        let criteria = &self.criteria;
        self.filtered = self
            .working_set
            .iter()
            .enumerate()
            .filter(|(_, txn)| criteria.matches(txn))
            .map(|(pos, _)| pos)
            .collect();

        let mut view = positions_to_refs(&self.working_set, &self.filtered);
        let dropped = self.selection.retain_visible(&view);

        sort_transactions(&mut view, &self.sort);
        let index = &self.index;
        self.sorted = view
            .iter()
            .filter_map(|txn| index.get(&txn.id).copied())
            .collect();

        self.pagination.clamp(self.sorted.len());

        debug!(
            total = self.working_set.len(),
            filtered = self.filtered.len(),
            dropped_selection = dropped,
            page = self.pagination.page_index(),
            "Recomputed review view"
        );
    }
}

fn positions_to_refs<'a>(working_set: &'a [Transaction], positions: &[usize]) -> Vec<&'a Transaction> {
    positions.iter().map(|&pos| &working_set[pos]).collect()
}

fn validate_reason(reason: &str) -> ReviewResult<&str> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ReviewError::Validation(
            "Exclusion reason cannot be blank".into(),
        ));
    }
    Ok(reason)
}

fn ensure_transition(
    txn: &Transaction,
    next: ReviewStatus,
    action: ReviewAction,
) -> ReviewResult<()> {
    if txn.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(ReviewError::Validation(format!(
            "Cannot {} transaction {}: it is already {}",
            action, txn.id, txn.status
        )))
    }
}
