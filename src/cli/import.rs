//! CLI command handler for bank statement import

use std::path::Path;

use crate::config::Settings;
use crate::error::{ReviewError, ReviewResult};
use crate::import::import_csv_file;
use crate::storage::JsonTransactionStore;

/// Import a statement and print what happened
pub fn handle_import_command(
    store: &JsonTransactionStore,
    settings: &Settings,
    file: &Path,
) -> ReviewResult<()> {
    if !file.exists() {
        return Err(ReviewError::Import(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let summary = import_csv_file(store, file, &settings.import_date_format)?;

    println!("Import Complete!");
    println!("  Imported:    {}", summary.imported);
    println!("  Duplicates:  {}", summary.duplicates);
    if !summary.errors.is_empty() {
        println!("  Errors:      {}", summary.errors.len());
        for error in &summary.errors {
            println!("    Row {}: {}", error.row_number, error.message);
        }
    }

    Ok(())
}
