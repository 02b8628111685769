//! txn-review - review imported bank transactions
//!
//! This library holds the review engine behind the `txn-review` binary. A
//! user loads imported transactions, narrows them with filters, orders and
//! pages through them, selects records, excludes or skips them, classifies
//! them as business or personal, undoes the last change and exports the
//! result.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory and settings
//! - `error`: Custom error types
//! - `models`: Transactions, ids and money
//! - `storage`: The persistence collaborator and its JSON file implementation
//! - `review`: Filter, sort, pagination, selection, undo and the engine
//! - `audit`: Audit trail of review changes
//! - `import`: Bank statement CSV import
//! - `export`: CSV and JSON export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers and the interactive session
//!
//! # Example
//!
//! ```rust,ignore
//! use txn_review::cli::open_engine;
//! use txn_review::config::{ReviewPaths, Settings};
//!
//! let paths = ReviewPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut engine = open_engine(&paths, &settings)?;
//! engine.set_search_text("coffee")?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod review;
pub mod storage;

pub use error::{ReviewError, ReviewResult};
