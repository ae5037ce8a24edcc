//! Roster CLI commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Roster commands.
#[derive(Debug, Parser)]
pub struct RosterCommand {
    #[command(subcommand)]
    pub action: RosterAction,
}

/// Available roster actions.
#[derive(Debug, Subcommand)]
pub enum RosterAction {
    /// Compare enrolled students with a student sheet.
    Check {
        /// Student sheet (CSV).
        students: PathBuf,
        /// Column holding the student's external id.
        #[arg(long, default_value = "sis_user_id")]
        id_column: String,
        /// Column holding the student's name.
        #[arg(long, default_value = "name")]
        name_column: String,
    },
}
