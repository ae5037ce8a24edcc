//! CLI command definitions.

pub mod assignments;
pub mod calendar;
pub mod groups;
pub mod roster;

use chrono::NaiveTime;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Config, DEFAULT_PER_PAGE};

/// Course administration against an LMS REST API.
#[derive(Debug, Parser)]
#[command(name = "coursesync")]
#[command(about = "Course administration against an LMS REST API", long_about = None)]
pub struct Cli {
    /// Platform base URL.
    #[arg(long, env = "CANVAS_DOMAIN")]
    pub base_url: String,

    /// API access token.
    #[arg(long, env = "CANVAS_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Course to operate on.
    #[arg(long, env = "CANVAS_COURSE_ID")]
    pub course_id: u64,

    /// Items per page on list endpoints.
    #[arg(long, env = "CANVAS_PER_PAGE", default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Due time (HH:MM) for due dates given without a time of day.
    #[arg(long, env = "COURSESYNC_DUE_TIME", default_value = "23:59", value_parser = parse_due_time)]
    pub due_time: NaiveTime,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection settings taken from the flags.
    pub fn config(&self) -> Config {
        let mut config = Config::new(&self.base_url, &self.token, self.course_id);
        config.per_page = self.per_page;
        config.default_due_time = self.due_time;
        config
    }
}

fn parse_due_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Roster reconciliation.
    Roster(roster::RosterCommand),
    /// Assignments and due-date overrides.
    Assignments(assignments::AssignmentsCommand),
    /// Group sets, groups and memberships.
    Groups(groups::GroupsCommand),
    /// Course calendar events.
    Calendar(calendar::CalendarCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec![
            "coursesync",
            "--base-url",
            "https://lms.example",
            "--token",
            "secret",
            "--course-id",
            "7",
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_global_flags_build_config() {
        let cli = parse(&["--due-time", "17:00", "roster", "check", "students.csv"]);

        let config = cli.config();

        assert_eq!(config.course_id, 7);
        assert_eq!(config.per_page, DEFAULT_PER_PAGE);
        assert_eq!(config.default_due_time, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_bad_due_time() {
        let result = Cli::try_parse_from([
            "coursesync",
            "--base-url",
            "https://lms.example",
            "--token",
            "secret",
            "--course-id",
            "7",
            "--due-time",
            "noon",
            "calendar",
            "list",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_prune_takes_many_ids() {
        let cli = parse(&["assignments", "prune", "501", "502"]);
        match cli.command {
            Commands::Assignments(cmd) => match cmd.action {
                assignments::AssignmentsAction::Prune { assignment_ids } => {
                    assert_eq!(assignment_ids, vec![501, 502]);
                }
                other => panic!("unexpected action {other:?}"),
            },
            other => panic!("unexpected command {other:?}"),
        }
    }
}
