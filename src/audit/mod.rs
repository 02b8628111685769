//! Audit trail for review mutations
//!
//! Every committed write the review engine makes (including undo restores)
//! is appended to a line-delimited JSON log.
//!
//! - `AuditEntry`: one mutation with before/after record state and a change summary.
//! - `AuditLogger`: appends entries to the JSONL file and reads them back.
//! - `summarize_change`: human-readable summary of the reviewable fields that changed.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_change;
pub use entry::AuditEntry;
pub use logger::AuditLogger;
