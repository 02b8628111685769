//! CLI command handlers
//!
//! Bridges the clap argument parsing in the binary with the review engine.

pub mod import;
pub mod review;
pub mod session;

pub use import::handle_import_command;
pub use review::{
    handle_config_command, handle_exclude_command, handle_export_command, handle_flag_command,
    handle_history_command, handle_list_command, handle_skip_command, handle_summary_command,
    FilterArgs, Classification,
};
pub use session::{parse_command, run_session, SessionCommand};

use crate::audit::AuditLogger;
use crate::config::{ReviewPaths, Settings};
use crate::error::ReviewResult;
use crate::review::ReviewEngine;
use crate::storage::{open_store, JsonTransactionStore};

/// Open the store and build a loaded engine configured from settings
pub fn open_engine(
    paths: &ReviewPaths,
    settings: &Settings,
) -> ReviewResult<ReviewEngine<JsonTransactionStore>> {
    let store = open_store(paths)?;
    let mut engine = ReviewEngine::from_settings(store, settings);
    if settings.audit_enabled {
        engine = engine.with_audit_logger(AuditLogger::new(paths.audit_log()));
    }
    engine.load()?;
    Ok(engine)
}
