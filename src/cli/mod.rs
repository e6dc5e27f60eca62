//! CLI command handlers
//!
//! Bridges the clap argument parsing in `main.rs` with the log store.

pub mod export;
pub mod history;

pub use export::{handle_export_command, ExportFormat};
pub use history::{find_entry, handle_history_command, handle_show_command, HistoryFilter};
