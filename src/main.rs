use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use auditlog::cli::{
    handle_export_command, handle_history_command, handle_show_command, ExportFormat,
    HistoryFilter,
};
use auditlog::config::{AuditPaths, Settings};
use auditlog::storage::JsonlStore;

#[derive(Parser)]
#[command(
    name = "auditlog",
    version,
    about = "Inspect change-audit logs of data model lifecycle events",
    long_about = "auditlog reads the append-only log written by the audit hooks \
                  and shows which records were created, updated, deleted or had \
                  their relations changed, field by field."
)]
struct Cli {
    /// Audit log file (overrides the configured location)
    #[arg(long, global = true, env = "AUDITLOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List log entries, oldest first
    #[command(alias = "ls")]
    History {
        /// Only entries for this model
        #[arg(short, long)]
        model: Option<String>,
        /// Only entries for this record key
        #[arg(short, long)]
        pk: Option<String>,
        /// Only entries made by this actor
        #[arg(short, long)]
        actor: Option<String>,
        /// Number of most recent entries to show (0 for all)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one entry with its field changes
    Show {
        /// Entry ID (full UUID or the short log-xxxxxxxx form)
        entry: String,
    },

    /// Export log entries
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only entries for this model
        #[arg(short, long)]
        model: Option<String>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Write the default settings file
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = AuditPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| settings.log_file(&paths));
    let store = JsonlStore::new(log_file);

    tracing::debug!(log_file = %store.path().display(), "audit log resolved");

    match cli.command {
        Some(Commands::History {
            model,
            pk,
            actor,
            limit,
        }) => {
            let filter = HistoryFilter {
                model,
                pk,
                actor,
                limit,
            };
            handle_history_command(&store, &settings, &filter)?;
        }
        Some(Commands::Show { entry }) => {
            handle_show_command(&store, &settings, &entry)?;
        }
        Some(Commands::Export {
            format,
            output,
            model,
            pretty,
        }) => {
            let filter = HistoryFilter {
                model,
                ..HistoryFilter::default()
            };
            handle_export_command(&store, &filter, format, output, pretty)?;
        }
        Some(Commands::Init) => {
            settings.save(&paths)?;
            println!("Settings written to {}", paths.settings_file().display());
        }
        Some(Commands::Config) => {
            println!("auditlog Configuration");
            println!("======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", store.path().display());
            println!("Log entries:    {}", store.entry_count()?);
            println!();
            println!("Settings:");
            println!("  Recording enabled: {}", settings.enabled);
            println!(
                "  Display: field{}old{}new, separated by {:?}",
                settings.display.colon, settings.display.arrow, settings.display.separator
            );
        }
        None => {
            println!("auditlog - change-audit log inspector");
            println!();
            println!("Run 'auditlog --help' for usage information.");
        }
    }

    Ok(())
}
