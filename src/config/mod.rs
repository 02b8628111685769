//! Configuration module for txn-review
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::ReviewPaths;
pub use settings::Settings;
