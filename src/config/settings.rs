//! User settings for txn-review
//!
//! Manages review preferences: page size, the sort applied when a session
//! starts, audit logging, and display/import formats.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::ReviewPaths;
use crate::error::ReviewError;
use crate::review::SortSpec;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// User settings for txn-review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Number of transactions per review page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Sort applied when a review session starts
    #[serde(default)]
    pub default_sort: SortSpec,

    /// Whether review mutations are appended to the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Currency symbol used for display
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format for display (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Date format expected in imported bank statements
    #[serde(default = "default_date_format")]
    pub import_date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            page_size: default_page_size(),
            default_sort: SortSpec::default(),
            audit_enabled: default_true(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            import_date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or default settings if the file doesn't exist
    pub fn load_or_create(paths: &ReviewPaths) -> Result<Self, ReviewError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ReviewError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ReviewError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.page_size == 0 {
            return Err(ReviewError::Config("page_size must be at least 1".into()));
        }
        for (name, format) in [
            ("date_format", &self.date_format),
            ("import_date_format", &self.import_date_format),
        ] {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ReviewError::Config(format!(
                    "{} '{}' is not a valid date format",
                    name, format
                )));
            }
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ReviewPaths) -> Result<(), ReviewError> {
        self.validate()?;
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ReviewError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ReviewError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
