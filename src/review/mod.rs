//! Transaction review engine
//!
//! The pieces are layered leaves first:
//!
//! - `records`: adapter over the persistence collaborator
//! - `filter`, `sort`: pure predicates and comparators
//! - `pagination`, `selection`: view-window and multi-select state
//! - `undo`: the single pending undo snapshot
//! - `engine`: owns the working set and wires everything together
//! - `view`: the owned read model the engine hands out

pub mod action;
pub mod engine;
pub mod filter;
pub mod pagination;
pub mod records;
pub mod selection;
pub mod sort;
pub mod undo;
pub mod view;

pub use action::ReviewAction;
pub use engine::ReviewEngine;
pub use filter::FilterCriteria;
pub use pagination::Pagination;
pub use records::RecordStore;
pub use selection::Selection;
pub use sort::{SortField, SortSpec};
pub use undo::{UndoManager, UndoSnapshot};
pub use view::{ReviewCounts, ReviewView};
