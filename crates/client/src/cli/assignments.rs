//! Assignment CLI commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use coursesync_core::course::PublishedFilter;

/// Assignment and override commands.
#[derive(Debug, Parser)]
pub struct AssignmentsCommand {
    #[command(subcommand)]
    pub action: AssignmentsAction,
}

/// Published state to list.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Published {
    #[default]
    All,
    Published,
    Unpublished,
}

impl From<Published> for PublishedFilter {
    fn from(p: Published) -> Self {
        match p {
            Published::All => PublishedFilter::All,
            Published::Published => PublishedFilter::Published,
            Published::Unpublished => PublishedFilter::Unpublished,
        }
    }
}

/// Available assignment actions.
#[derive(Debug, Subcommand)]
pub enum AssignmentsAction {
    /// List the course's assignments.
    List {
        #[arg(long, value_enum, default_value = "all")]
        published: Published,
    },
    /// Give students individual due dates from a wide sheet.
    ///
    /// Every column other than id and name is labelled with a due date and
    /// holds assignment codes.
    Assign {
        /// Student sheet (CSV).
        students: PathBuf,
        /// Code sheet (CSV) mapping assignment codes to assignment ids.
        codes: PathBuf,
        #[arg(long, default_value = "sis_user_id")]
        id_column: String,
        #[arg(long, default_value = "name")]
        name_column: String,
        #[arg(long, default_value = "code")]
        code_column: String,
        #[arg(long, default_value = "assignment_id")]
        assignment_column: String,
        /// Refuse to assign unless the sheet matches the roster.
        #[arg(long)]
        check_enrollment: bool,
    },
    /// Give groups due dates from a practical timetable.
    AssignGroups {
        /// Assignments sheet (CSV) with `assignment_id` and `name` columns.
        assignments: PathBuf,
        /// Sheet (CSV) with `practical` and `assignment` name columns.
        practicals: PathBuf,
        /// Sheet (CSV) with `practical`, `group` and `group_id` columns.
        groups: PathBuf,
        /// Timetable (CSV): one row per practical, one column per date.
        schedule: PathBuf,
        /// Timetable column naming the practical.
        #[arg(long, default_value = "Practical")]
        practical_column: String,
        /// Days between the practical and the due date.
        #[arg(long, default_value = "7")]
        offset_days: i64,
    },
    /// Delete every override of the given assignments.
    Prune {
        #[arg(required = true)]
        assignment_ids: Vec<u64>,
    },
    /// Delete only group overrides of the given assignments.
    PruneGroups {
        #[arg(required = true)]
        assignment_ids: Vec<u64>,
    },
    /// List enrolled students without an individual override.
    Audit {
        /// Assignments sheet (CSV) with `assignment_id` and `name` columns.
        assignments: PathBuf,
    },
}
