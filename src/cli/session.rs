//! Interactive review session
//!
//! A line-oriented loop over any reader and writer. Each line is parsed into
//! a [`SessionCommand`] and applied to the engine; the current page is
//! printed after every change. Engine errors are reported and the session
//! continues.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::NaiveDate;

use super::review::{parse_date, parse_money, parse_sort_field, parse_status};
use crate::display::{
    format_review_summary, format_transaction_details, format_transaction_register,
    format_view_footer, DisplayOptions,
};
use crate::error::{ReviewError, ReviewResult};
use crate::export::ExportFormat;
use crate::models::{Money, ReviewStatus, TransactionId};
use crate::review::{ReviewEngine, SortSpec};
use crate::storage::TransactionStore;

/// A parsed session command; rows are 1-based positions on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Search(String),
    Status(Option<ReviewStatus>),
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Min(Option<Money>),
    Max(Option<Money>),
    ClearFilters,
    Sort(SortSpec),
    NextPage,
    PreviousPage,
    Page(usize),
    Toggle(usize),
    SelectAll,
    SelectPending,
    SelectNone,
    /// Flag one row, or every selected transaction when no row is given
    Business(Option<usize>),
    Personal(Option<usize>),
    Exclude {
        row: Option<usize>,
        reason: String,
    },
    Skip(usize),
    Undo,
    Export {
        format: ExportFormat,
        path: PathBuf,
    },
    Show(usize),
    List,
    Summary,
    Help,
    Quit,
}

/// Help line for one command
struct CommandHelp {
    usage: &'static str,
    description: &'static str,
}

static HELP: &[CommandHelp] = &[
    CommandHelp {
        usage: "search <text>",
        description: "Filter by description text (empty clears)",
    },
    CommandHelp {
        usage: "status [pending|excluded|skipped]",
        description: "Filter by review status (no argument clears)",
    },
    CommandHelp {
        usage: "from [YYYY-MM-DD]",
        description: "Earliest date, inclusive",
    },
    CommandHelp {
        usage: "to [YYYY-MM-DD]",
        description: "Latest date, inclusive",
    },
    CommandHelp {
        usage: "min [amount]",
        description: "Minimum absolute amount",
    },
    CommandHelp {
        usage: "max [amount]",
        description: "Maximum absolute amount",
    },
    CommandHelp {
        usage: "clear",
        description: "Remove all filters",
    },
    CommandHelp {
        usage: "sort <date|amount|description> [asc|desc]",
        description: "Change the sort order",
    },
    CommandHelp {
        usage: "next, prev, page <n>",
        description: "Move between pages",
    },
    CommandHelp {
        usage: "toggle <row>",
        description: "Select or deselect a row",
    },
    CommandHelp {
        usage: "all, pending, none",
        description: "Select every filtered / every pending / nothing",
    },
    CommandHelp {
        usage: "business [row], personal [row]",
        description: "Classify a row, or the selection",
    },
    CommandHelp {
        usage: "exclude [row] [--] <reason>",
        description: "Exclude a row, or the pending selection (put -- before a reason that starts with a number)",
    },
    CommandHelp {
        usage: "skip <row>",
        description: "Skip a pending row",
    },
    CommandHelp {
        usage: "undo",
        description: "Revert the last change",
    },
    CommandHelp {
        usage: "export <csv|json> <path>",
        description: "Write the filtered view to a file",
    },
    CommandHelp {
        usage: "show <row>",
        description: "Show transaction details",
    },
    CommandHelp {
        usage: "list, summary",
        description: "Reprint the page or the review summary",
    },
    CommandHelp {
        usage: "help, quit",
        description: "Show this help or leave the session",
    },
];

fn parse_row(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(format!("Invalid row number: {}", arg)),
    }
}

fn optional<T>(
    rest: &str,
    parse: impl Fn(&str) -> ReviewResult<T>,
) -> Result<Option<T>, String> {
    if rest.is_empty() {
        Ok(None)
    } else {
        parse(rest).map(Some).map_err(|e| e.to_string())
    }
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Err("Empty command".to_string()),
        "search" | "/" => SessionCommand::Search(rest.to_string()),
        "status" => SessionCommand::Status(optional(rest, parse_status)?),
        "from" => SessionCommand::From(optional(rest, parse_date)?),
        "to" => SessionCommand::To(optional(rest, parse_date)?),
        "min" => SessionCommand::Min(optional(rest, parse_money)?),
        "max" => SessionCommand::Max(optional(rest, parse_money)?),
        "clear" => SessionCommand::ClearFilters,
        "sort" => {
            let mut args = rest.split_whitespace();
            let field = args
                .next()
                .ok_or("Usage: sort <date|amount|description> [asc|desc]")?;
            let field = parse_sort_field(field).map_err(|e| e.to_string())?;
            let ascending = match args.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("desc") => false,
                Some("asc") => true,
                Some(other) => return Err(format!("Unknown sort direction: {}", other)),
            };
            SessionCommand::Sort(SortSpec::new(field, ascending))
        }
        "next" | "n" => SessionCommand::NextPage,
        "prev" | "p" => SessionCommand::PreviousPage,
        "page" => SessionCommand::Page(parse_row(rest)?),
        "toggle" | "t" => SessionCommand::Toggle(parse_row(rest)?),
        "all" => SessionCommand::SelectAll,
        "pending" => SessionCommand::SelectPending,
        "none" => SessionCommand::SelectNone,
        "business" | "b" => SessionCommand::Business(optional_row(rest)?),
        "personal" => SessionCommand::Personal(optional_row(rest)?),
        "exclude" | "x" => {
            let (row, reason) = match rest.split_once(char::is_whitespace) {
                Some((first, reason)) if first.parse::<usize>().is_ok() => {
                    (Some(parse_row(first)?), reason.trim())
                }
                _ if rest.parse::<usize>().is_ok() => (Some(parse_row(rest)?), ""),
                _ => (None, rest),
            };
            let reason = match reason.split_once(char::is_whitespace) {
                Some(("--", after)) => after.trim(),
                _ if reason == "--" => "",
                _ => reason,
            };
            if reason.is_empty() {
                return Err("Usage: exclude [row] [--] <reason>".to_string());
            }
            SessionCommand::Exclude {
                row,
                reason: reason.to_string(),
            }
        }
        "skip" | "s" => SessionCommand::Skip(parse_row(rest)?),
        "undo" | "u" => SessionCommand::Undo,
        "export" => {
            let (format, path) = rest
                .split_once(char::is_whitespace)
                .ok_or("Usage: export <csv|json> <path>")?;
            let format = ExportFormat::parse(format)
                .ok_or_else(|| format!("Unknown export format: {}", format))?;
            SessionCommand::Export {
                format,
                path: PathBuf::from(path.trim()),
            }
        }
        "show" => SessionCommand::Show(parse_row(rest)?),
        "list" | "ls" => SessionCommand::List,
        "summary" => SessionCommand::Summary,
        "help" | "?" => SessionCommand::Help,
        "quit" | "q" | "exit" => SessionCommand::Quit,
        other => return Err(format!("Unknown command: {} (type 'help')", other)),
    };

    Ok(command)
}

fn optional_row(rest: &str) -> Result<Option<usize>, String> {
    if rest.is_empty() {
        Ok(None)
    } else {
        parse_row(rest).map(Some)
    }
}

/// Run the session until `quit` or end of input
pub fn run_session<S, R, W>(
    engine: &mut ReviewEngine<S>,
    input: R,
    output: &mut W,
    options: &DisplayOptions,
) -> ReviewResult<()>
where
    S: TransactionStore,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Reviewing transactions. Type 'help' for commands.")?;
    render_page(engine, output, options)?;

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "Error: {}", message)?;
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }

        match execute(engine, command, output, options) {
            Ok(()) => {}
            // Output failures end the session; engine failures do not
            Err(ReviewError::Io(e)) => return Err(ReviewError::Io(e)),
            Err(e) => writeln!(output, "Error: {}", e)?,
        }
    }

    writeln!(output)?;
    writeln!(
        output,
        "Reviewed {} of {} transactions.",
        engine.reviewed_count(),
        engine.total_count()
    )?;
    Ok(())
}

fn execute<S, W>(
    engine: &mut ReviewEngine<S>,
    command: SessionCommand,
    output: &mut W,
    options: &DisplayOptions,
) -> ReviewResult<()>
where
    S: TransactionStore,
    W: Write,
{
    match command {
        SessionCommand::Search(text) => engine.set_search_text(text)?,
        SessionCommand::Status(status) => engine.set_status_filter(status)?,
        SessionCommand::From(from) => {
            let to = engine.filter().date_to;
            engine.set_date_range(from, to)?;
        }
        SessionCommand::To(to) => {
            let from = engine.filter().date_from;
            engine.set_date_range(from, to)?;
        }
        SessionCommand::Min(min) => {
            let max = engine.filter().max_amount;
            engine.set_amount_range(min, max)?;
        }
        SessionCommand::Max(max) => {
            let min = engine.filter().min_amount;
            engine.set_amount_range(min, max)?;
        }
        SessionCommand::ClearFilters => engine.clear_filters(),
        SessionCommand::Sort(spec) => engine.set_sort(spec),
        SessionCommand::NextPage => {
            if !engine.next_page() {
                writeln!(output, "Already on the last page.")?;
                return Ok(());
            }
        }
        SessionCommand::PreviousPage => {
            if !engine.previous_page() {
                writeln!(output, "Already on the first page.")?;
                return Ok(());
            }
        }
        SessionCommand::Page(page) => engine.go_to_page(page.saturating_sub(1)),
        SessionCommand::Toggle(row) => {
            let id = row_id(engine, row)?;
            engine.toggle_selection(id);
        }
        SessionCommand::SelectAll => engine.select_all(),
        SessionCommand::SelectPending => engine.select_all_pending(),
        SessionCommand::SelectNone => engine.clear_selection(),
        SessionCommand::Business(Some(row)) => {
            let id = row_id(engine, row)?;
            engine.set_business_flag(id, true)?;
        }
        SessionCommand::Business(None) => {
            let count = engine.batch_mark_business()?;
            writeln!(output, "Marked {} transactions as business.", count)?;
        }
        SessionCommand::Personal(Some(row)) => {
            let id = row_id(engine, row)?;
            engine.set_business_flag(id, false)?;
        }
        SessionCommand::Personal(None) => {
            let count = engine.batch_mark_personal()?;
            writeln!(output, "Marked {} transactions as personal.", count)?;
        }
        SessionCommand::Exclude {
            row: Some(row),
            reason,
        } => {
            let id = row_id(engine, row)?;
            engine.exclude(id, &reason)?;
        }
        SessionCommand::Exclude { row: None, reason } => {
            let count = engine.batch_exclude(&reason)?;
            writeln!(output, "Excluded {} transactions.", count)?;
        }
        SessionCommand::Skip(row) => {
            let id = row_id(engine, row)?;
            engine.skip(id)?;
        }
        SessionCommand::Undo => {
            let description = engine.undo_description();
            let restored = engine.undo()?;
            match description {
                Some(description) if !restored.is_empty() => {
                    writeln!(output, "{}: restored {} records.", description, restored.len())?
                }
                _ => writeln!(output, "Nothing to undo.")?,
            }
        }
        SessionCommand::Export { format, path } => {
            let count = match format {
                ExportFormat::Csv => engine.export_csv(&path)?,
                ExportFormat::Json => engine.export_json(&path)?,
            };
            writeln!(
                output,
                "Exported {} transactions to {} ({})",
                count,
                path.display(),
                format
            )?;
            return Ok(());
        }
        SessionCommand::Show(row) => {
            let id = row_id(engine, row)?;
            if let Some(txn) = engine.find(id) {
                write!(output, "{}", format_transaction_details(txn, options))?;
            }
            return Ok(());
        }
        SessionCommand::List => {}
        SessionCommand::Summary => {
            write!(output, "{}", format_review_summary(&engine.counts()))?;
            return Ok(());
        }
        SessionCommand::Help => {
            write_help(output)?;
            return Ok(());
        }
        SessionCommand::Quit => return Ok(()),
    }

    render_page(engine, output, options)?;
    Ok(())
}

/// Id of a 1-based row on the current page
fn row_id<S: TransactionStore>(engine: &ReviewEngine<S>, row: usize) -> ReviewResult<TransactionId> {
    engine
        .current_page_items()
        .get(row.wrapping_sub(1))
        .map(|txn| txn.id)
        .ok_or_else(|| ReviewError::Validation(format!("No row {} on this page", row)))
}

fn render_page<S, W>(
    engine: &ReviewEngine<S>,
    output: &mut W,
    options: &DisplayOptions,
) -> ReviewResult<()>
where
    S: TransactionStore,
    W: Write,
{
    if engine.is_empty_state() {
        writeln!(output, "No transactions to review. Import a bank statement first.")?;
        return Ok(());
    }
    if engine.is_no_results() {
        writeln!(output, "No transactions match the current filter.")?;
        writeln!(output, "{}", engine.result_count_text())?;
        return Ok(());
    }

    let items = engine.current_page_items();
    write!(
        output,
        "{}",
        format_transaction_register(&items, |t| engine.is_selected(t.id), options)
    )?;
    writeln!(output, "{}", format_view_footer(&engine.view()))?;
    Ok(())
}

fn write_help<W: Write>(output: &mut W) -> ReviewResult<()> {
    writeln!(output, "Commands:")?;
    for help in HELP {
        writeln!(output, "  {:<44} {}", help.usage, help.description)?;
    }
    Ok(())
}
