//! Group CLI commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Group commands.
#[derive(Debug, Parser)]
pub struct GroupsCommand {
    #[command(subcommand)]
    pub action: GroupsAction,
}

/// Available group actions.
#[derive(Debug, Subcommand)]
pub enum GroupsAction {
    /// List group sets.
    Sets,
    /// Create group sets, skipping names that exist.
    CreateSets {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List the groups of a group set.
    List { group_set_id: u64 },
    /// Create the named groups in each set, skipping names that exist.
    Ensure {
        /// Group set id (repeatable).
        #[arg(long = "set", required = true)]
        group_set_ids: Vec<u64>,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Delete every group of a group set.
    DeleteAll { group_set_id: u64 },
    /// Place students in groups from a wide sheet.
    ///
    /// Columns named after a group set hold the group to join in that set.
    Assign {
        /// Student sheet (CSV).
        students: PathBuf,
        #[arg(long, default_value = "sis_user_id")]
        id_column: String,
        #[arg(long, default_value = "name")]
        name_column: String,
    },
}
