//! Calendar CLI commands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Calendar commands.
#[derive(Debug, Parser)]
pub struct CalendarCommand {
    #[command(subcommand)]
    pub action: CalendarAction,
}

/// Available calendar actions.
#[derive(Debug, Subcommand)]
pub enum CalendarAction {
    /// List course events.
    List {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Get an event by id.
    Get { id: u64 },
    /// Create events from a schedule, skipping any that overlap.
    Upload {
        /// Schedule sheet (CSV).
        schedule: PathBuf,
    },
    /// Delete every event in range.
    Remove {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Write a schedule to an iCalendar file.
    Export {
        /// Schedule sheet (CSV).
        schedule: PathBuf,
        /// File name, without extension.
        #[arg(long)]
        name: String,
        /// Directory to write into.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}
