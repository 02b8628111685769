//! One-shot review commands
//!
//! Each command loads the working set, applies the requested filter and
//! sort, performs one action and prints the result.

use std::path::Path;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use crate::audit::AuditLogger;
use crate::config::{ReviewPaths, Settings};
use crate::display::{
    format_review_summary, format_transaction_details, format_transaction_register,
    format_view_footer, DisplayOptions,
};
use crate::error::{ReviewError, ReviewResult};
use crate::export::ExportFormat;
use crate::models::{Money, ReviewStatus};
use crate::review::{FilterCriteria, ReviewEngine, SortField, SortSpec};
use crate::storage::TransactionStore;

/// Filter and sort options shared by `list` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text to look for in descriptions
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only show one status (pending, excluded, skipped)
    #[arg(long)]
    pub status: Option<String>,
    /// Earliest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Latest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    /// Minimum absolute amount (e.g. "15.00")
    #[arg(long)]
    pub min: Option<String>,
    /// Maximum absolute amount
    #[arg(long)]
    pub max: Option<String>,
    /// Sort field (date, amount, description)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
}

impl FilterArgs {
    /// Build filter criteria from the arguments
    pub fn to_criteria(&self) -> ReviewResult<FilterCriteria> {
        Ok(FilterCriteria {
            search_text: self.search.clone(),
            status: self.status.as_deref().map(parse_status).transpose()?,
            date_from: self.from.as_deref().map(parse_date).transpose()?,
            date_to: self.to.as_deref().map(parse_date).transpose()?,
            min_amount: self.min.as_deref().map(parse_money).transpose()?,
            max_amount: self.max.as_deref().map(parse_money).transpose()?,
        })
    }

    /// Sort requested on the command line, falling back to `default`
    pub fn sort_spec(&self, default: SortSpec) -> ReviewResult<SortSpec> {
        match &self.sort {
            Some(field) => Ok(SortSpec::new(parse_sort_field(field)?, self.asc)),
            None if self.asc => Ok(SortSpec::new(default.field, true)),
            None => Ok(default),
        }
    }

    /// Apply filter and sort to an engine
    pub fn apply<S: TransactionStore>(&self, engine: &mut ReviewEngine<S>) -> ReviewResult<()> {
        let sort = self.sort_spec(engine.sort_spec())?;
        engine.set_filter(self.to_criteria()?)?;
        engine.set_sort(sort);
        Ok(())
    }
}

/// Business or personal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Classification {
    Business,
    Personal,
}

impl Classification {
    pub fn is_business(self) -> bool {
        self == Self::Business
    }
}

pub(crate) fn parse_date(s: &str) -> ReviewResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        ReviewError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
}

pub(crate) fn parse_money(s: &str) -> ReviewResult<Money> {
    Money::parse(s).map_err(|e| ReviewError::Validation(format!("Invalid amount '{}': {}", s, e)))
}

pub(crate) fn parse_status(s: &str) -> ReviewResult<ReviewStatus> {
    ReviewStatus::parse(s).ok_or_else(|| {
        ReviewError::Validation(format!(
            "Unknown status '{}', expected pending, excluded or skipped",
            s
        ))
    })
}

pub(crate) fn parse_sort_field(s: &str) -> ReviewResult<SortField> {
    SortField::parse(s).ok_or_else(|| {
        ReviewError::Validation(format!(
            "Unknown sort field '{}', expected date, amount or description",
            s
        ))
    })
}

/// Print one page of the filtered, sorted view
pub fn handle_list_command<S: TransactionStore>(
    engine: &mut ReviewEngine<S>,
    filter: &FilterArgs,
    page: usize,
    options: &DisplayOptions,
) -> ReviewResult<()> {
    filter.apply(engine)?;
    engine.go_to_page(page.saturating_sub(1));

    if engine.is_empty_state() {
        println!("No transactions yet. Run 'txn-review import <file>' to load a bank statement.");
        return Ok(());
    }
    if engine.is_no_results() {
        println!("No transactions match the current filter.");
        return Ok(());
    }

    let items = engine.current_page_items();
    print!(
        "{}",
        format_transaction_register(&items, |t| engine.is_selected(t.id), options)
    );
    println!();
    println!("{}", format_view_footer(&engine.view()));
    Ok(())
}

/// Print status counts and progress
pub fn handle_summary_command<S: TransactionStore>(engine: &ReviewEngine<S>) -> ReviewResult<()> {
    print!("{}", format_review_summary(&engine.counts()));
    Ok(())
}

pub fn handle_exclude_command<S: TransactionStore>(
    engine: &mut ReviewEngine<S>,
    reference: &str,
    reason: &str,
    options: &DisplayOptions,
) -> ReviewResult<()> {
    let id = engine.resolve_reference(reference)?;
    let txn = engine.exclude(id, reason)?;
    println!("Excluded transaction:");
    print!("{}", format_transaction_details(&txn, options));
    Ok(())
}

pub fn handle_skip_command<S: TransactionStore>(
    engine: &mut ReviewEngine<S>,
    reference: &str,
    options: &DisplayOptions,
) -> ReviewResult<()> {
    let id = engine.resolve_reference(reference)?;
    let txn = engine.skip(id)?;
    println!("Skipped transaction:");
    print!("{}", format_transaction_details(&txn, options));
    Ok(())
}

pub fn handle_flag_command<S: TransactionStore>(
    engine: &mut ReviewEngine<S>,
    reference: &str,
    classification: Classification,
    options: &DisplayOptions,
) -> ReviewResult<()> {
    let id = engine.resolve_reference(reference)?;
    let txn = engine.set_business_flag(id, classification.is_business())?;
    println!("Updated transaction:");
    print!("{}", format_transaction_details(&txn, options));
    Ok(())
}

/// Export the filtered view (all pages)
pub fn handle_export_command<S: TransactionStore>(
    engine: &mut ReviewEngine<S>,
    format: ExportFormat,
    output: &Path,
    filter: &FilterArgs,
) -> ReviewResult<()> {
    filter.apply(engine)?;
    let count = match format {
        ExportFormat::Csv => engine.export_csv(output)?,
        ExportFormat::Json => engine.export_json(output)?,
    };
    println!(
        "Exported {} transactions to {} ({})",
        count,
        output.display(),
        format
    );
    Ok(())
}

/// Print the most recent audit entries
pub fn handle_history_command(paths: &ReviewPaths, limit: usize) -> ReviewResult<()> {
    let logger = AuditLogger::new(paths.audit_log());
    let entries = logger.read_recent(limit)?;

    if entries.is_empty() {
        println!("No review history yet.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}

/// Show paths and settings
pub fn handle_config_command(paths: &ReviewPaths, settings: &Settings) -> ReviewResult<()> {
    println!("txn-review Configuration");
    println!("========================");
    println!("Base directory:    {}", paths.base_dir().display());
    println!("Transactions file: {}", paths.transactions_file().display());
    println!("Settings file:     {}", paths.settings_file().display());
    println!("Audit log:         {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Page size:       {}", settings.page_size);
    println!("  Default sort:    {}", settings.default_sort);
    println!("  Audit enabled:   {}", settings.audit_enabled);
    println!("  Currency symbol: {}", settings.currency_symbol);
    println!("  Date format:     {}", settings.date_format);
    println!("  Import format:   {}", settings.import_date_format);
    Ok(())
}
