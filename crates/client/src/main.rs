//! coursesync CLI entry point.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use coursesync_client::cli::assignments::AssignmentsAction;
use coursesync_client::cli::calendar::CalendarAction;
use coursesync_client::cli::groups::GroupsAction;
use coursesync_client::cli::roster::RosterAction;
use coursesync_client::cli::{Cli, Commands};
use coursesync_client::output::{pretty, render, render_batch};
use coursesync_client::sync::{
    export_to_portable_calendar, CalendarSynchronizer, GroupProvisioner, OverrideSynchronizer,
    RosterReconciler,
};
use coursesync_client::CanvasClient;
use coursesync_core::calendar::EventRange;
use coursesync_core::overrides::GroupScheduleInput;
use coursesync_core::platform::GroupApi;
use coursesync_core::table::{
    id_map, practical_schedule_rows, schedule_rows, scoped_id_index, student_rows, text_map,
    ScheduleColumns, Table,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "coursesync_client=warn,coursesync_core=warn"
    } else {
        "coursesync_client=info,coursesync_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config();
    let client = CanvasClient::new(&config)?;
    let format = cli.format;

    match cli.command {
        Commands::Roster(roster_cmd) => match roster_cmd.action {
            RosterAction::Check {
                students,
                id_column,
                name_column,
            } => {
                let rows = student_rows(&load(&students)?, &id_column, &name_column)?;
                let diff = RosterReconciler::new(&client).check(&rows).await?;
                println!("{}", render(&diff, format, pretty::format_roster_diff));
            }
        },
        Commands::Assignments(assignments_cmd) => {
            let sync = OverrideSynchronizer::new(&client, config.default_due_time);
            match assignments_cmd.action {
                AssignmentsAction::List { published } => {
                    let assignments = sync.list_assignments(published.into()).await?;
                    println!("{}", render(&assignments[..], format, pretty::format_assignments));
                }
                AssignmentsAction::Assign {
                    students,
                    codes,
                    id_column,
                    name_column,
                    code_column,
                    assignment_column,
                    check_enrollment,
                } => {
                    let rows = student_rows(&load(&students)?, &id_column, &name_column)?;
                    let codes = id_map(&load(&codes)?, &code_column, &assignment_column)?;
                    let report = sync.assign_students(&rows, &codes, check_enrollment).await?;
                    println!("{}", render(&report, format, pretty::format_student_report));
                }
                AssignmentsAction::AssignGroups {
                    assignments,
                    practicals,
                    groups,
                    schedule,
                    practical_column,
                    offset_days,
                } => {
                    let assignment_names = assignment_names(&assignments)?;
                    let mut assignment_ids: Vec<u64> = assignment_names.keys().copied().collect();
                    assignment_ids.sort_unstable();
                    let practical_to_assignment =
                        text_map(&load(&practicals)?, "practical", "assignment")?;
                    let groups = scoped_id_index(&load(&groups)?, "practical", "group", "group_id")?;
                    let schedule = practical_schedule_rows(&load(&schedule)?, &practical_column)?;

                    let outcomes = sync
                        .assign_by_group_schedule(&GroupScheduleInput {
                            assignment_ids: &assignment_ids,
                            assignment_names: &assignment_names,
                            practical_to_assignment: &practical_to_assignment,
                            groups: &groups,
                            schedule: &schedule,
                            offset_days,
                            default_time: config.default_due_time,
                        })
                        .await;
                    println!(
                        "{}",
                        render_batch(&outcomes, format, pretty::format_override_outcomes)
                    );
                }
                AssignmentsAction::Prune { assignment_ids } => {
                    let outcomes = sync.prune_overrides(&assignment_ids).await?;
                    println!("{}", render_batch(&outcomes, format, pretty::format_prune_outcomes));
                }
                AssignmentsAction::PruneGroups { assignment_ids } => {
                    let outcomes = sync.prune_group_overrides(&assignment_ids).await?;
                    println!("{}", render_batch(&outcomes, format, pretty::format_prune_outcomes));
                }
                AssignmentsAction::Audit { assignments } => {
                    let audits = sync
                        .audit_completions(&assignment_names(&assignments)?)
                        .await?;
                    println!("{}", render(&audits[..], format, pretty::format_audits));
                }
            }
        }
        Commands::Groups(groups_cmd) => {
            let provisioner = GroupProvisioner::new(&client);
            match groups_cmd.action {
                GroupsAction::Sets => {
                    let sets = provisioner.list_group_sets().await?;
                    println!("{}", render(&sets[..], format, pretty::format_group_sets));
                }
                GroupsAction::CreateSets { names } => {
                    let outcomes = provisioner.create_group_sets(&names).await;
                    println!(
                        "{}",
                        render_batch(&outcomes, format, pretty::format_group_set_outcomes)
                    );
                }
                GroupsAction::List { group_set_id } => {
                    let groups = provisioner.list_groups(group_set_id).await?;
                    println!("{}", render(&groups[..], format, pretty::format_groups));
                }
                GroupsAction::Ensure {
                    group_set_ids,
                    names,
                } => {
                    let reports = provisioner
                        .ensure_groups_across_sets(&group_set_ids, &names)
                        .await;
                    println!("{}", render(&reports, format, pretty::format_provision_reports));
                }
                GroupsAction::DeleteAll { group_set_id } => {
                    let outcomes = provisioner.delete_all_groups_in_set(group_set_id).await?;
                    println!("{}", render_batch(&outcomes, format, pretty::format_group_deletions));
                }
                GroupsAction::Assign {
                    students,
                    id_column,
                    name_column,
                } => {
                    let table = load(&students)?;
                    let rows = student_rows(&table, &id_column, &name_column)?;
                    // Sheet columns named after a group set select that set.
                    let group_set_ids: HashMap<String, u64> = client
                        .list_group_sets()
                        .await?
                        .into_iter()
                        .filter(|set| table.headers().contains(&set.name))
                        .map(|set| (set.name, set.id))
                        .collect();
                    if group_set_ids.is_empty() {
                        anyhow::bail!("no column of {} names a group set", students.display());
                    }
                    let set_ids: Vec<u64> = group_set_ids.values().copied().collect();
                    let index = provisioner.group_index(&set_ids).await?;
                    let outcomes = provisioner
                        .assign_students_to_groups(&rows, &group_set_ids, &index)
                        .await?;
                    println!(
                        "{}",
                        render_batch(&outcomes, format, pretty::format_membership_outcomes)
                    );
                }
            }
        }
        Commands::Calendar(calendar_cmd) => {
            let sync = CalendarSynchronizer::new(&client);
            match calendar_cmd.action {
                CalendarAction::List { start, end } => {
                    let events = sync.fetch_events(EventRange::new(start, end)).await?;
                    println!("{}", render(&events[..], format, pretty::format_events));
                }
                CalendarAction::Get { id } => {
                    let event = sync.fetch_event(id).await?;
                    println!("{}", render(&event, format, pretty::format_event));
                }
                CalendarAction::Upload { schedule } => {
                    let rows = schedule_rows(&load(&schedule)?, &ScheduleColumns::default())?;
                    let outcomes = sync.upload_schedule(&rows).await?;
                    println!("{}", render_batch(&outcomes, format, pretty::format_upload_outcomes));
                }
                CalendarAction::Remove { start, end } => {
                    let outcomes = sync.remove_events(EventRange::new(start, end)).await?;
                    println!(
                        "{}",
                        render_batch(&outcomes, format, pretty::format_removal_outcomes)
                    );
                }
                CalendarAction::Export {
                    schedule,
                    name,
                    out_dir,
                } => {
                    let rows = schedule_rows(&load(&schedule)?, &ScheduleColumns::default())?;
                    let path = export_to_portable_calendar(&rows, &out_dir, &name)?;
                    if !cli.quiet {
                        println!("Wrote {} events to {}", rows.len(), path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> anyhow::Result<Table> {
    Table::from_path(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Reads an `assignment_id,name` sheet into id -> name.
fn assignment_names(path: &Path) -> anyhow::Result<HashMap<u64, String>> {
    let by_name = id_map(&load(path)?, "name", "assignment_id")?;
    Ok(by_name.into_iter().map(|(name, id)| (id, name)).collect())
}
