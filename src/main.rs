use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use txn_review::cli::{
    handle_config_command, handle_exclude_command, handle_export_command, handle_flag_command,
    handle_history_command, handle_import_command, handle_list_command, handle_skip_command,
    handle_summary_command, open_engine, run_session, Classification, FilterArgs,
};
use txn_review::config::{ReviewPaths, Settings};
use txn_review::display::DisplayOptions;
use txn_review::export::ExportFormat;
use txn_review::storage::open_store;

#[derive(Parser)]
#[command(
    name = "txn-review",
    author = "Kaylee Beyene",
    version,
    about = "Review imported bank transactions",
    long_about = "txn-review loads imported bank transactions and lets you filter, \
                  sort and page through them, exclude or skip records, classify them \
                  as business or personal, undo the last change and export the result."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import transactions from a bank statement CSV
    Import {
        /// Path to CSV file
        file: PathBuf,
    },

    /// List one page of transactions
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show review progress
    Summary,

    /// Exclude a pending transaction
    Exclude {
        /// Transaction id or displayed prefix (txn-xxxxxxxx)
        id: String,
        /// Why the transaction is excluded
        #[arg(short, long)]
        reason: String,
    },

    /// Skip a pending transaction
    Skip {
        /// Transaction id or displayed prefix
        id: String,
    },

    /// Classify a transaction as business or personal
    Flag {
        /// Transaction id or displayed prefix
        id: String,
        #[arg(value_enum)]
        classification: Classification,
    },

    /// Export the filtered transactions
    Export {
        /// Output format (csv or json)
        format: String,
        /// Output file
        path: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show recent review history
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },

    /// Start an interactive review session
    Review,

    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = ReviewPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let options = DisplayOptions::from_settings(&settings);

    match cli.command {
        Some(Commands::Import { file }) => {
            let store = open_store(&paths)?;
            handle_import_command(&store, &settings, &file)?;
        }
        Some(Commands::List { filter, page }) => {
            let mut engine = open_engine(&paths, &settings)?;
            handle_list_command(&mut engine, &filter, page, &options)?;
        }
        Some(Commands::Summary) => {
            let engine = open_engine(&paths, &settings)?;
            handle_summary_command(&engine)?;
        }
        Some(Commands::Exclude { id, reason }) => {
            let mut engine = open_engine(&paths, &settings)?;
            handle_exclude_command(&mut engine, &id, &reason, &options)?;
        }
        Some(Commands::Skip { id }) => {
            let mut engine = open_engine(&paths, &settings)?;
            handle_skip_command(&mut engine, &id, &options)?;
        }
        Some(Commands::Flag { id, classification }) => {
            let mut engine = open_engine(&paths, &settings)?;
            handle_flag_command(&mut engine, &id, classification, &options)?;
        }
        Some(Commands::Export {
            format,
            path,
            filter,
        }) => {
            let Some(format) = ExportFormat::parse(&format) else {
                bail!("Unknown export format '{}', expected csv or json", format);
            };
            let mut engine = open_engine(&paths, &settings)?;
            handle_export_command(&mut engine, format, &path, &filter)?;
        }
        Some(Commands::History { count }) => {
            handle_history_command(&paths, count)?;
        }
        Some(Commands::Review) => {
            let mut engine = open_engine(&paths, &settings)?;
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            run_session(&mut engine, stdin.lock(), &mut stdout, &options)?;
        }
        Some(Commands::Config) => {
            handle_config_command(&paths, &settings)?;
        }
        None => {
            println!("txn-review - review imported bank transactions");
            println!();
            println!("Run 'txn-review --help' for usage information.");
            println!("Run 'txn-review review' to start an interactive session.");
        }
    }

    Ok(())
}
