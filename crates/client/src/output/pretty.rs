//! Pretty output formatting.

use std::collections::BTreeMap;

use coursesync_core::calendar::format_event_time;
use coursesync_core::course::{Assignment, CalendarEvent, Group, GroupSet};
use coursesync_core::roster::{RosterDiff, RosterEntry};

use crate::sync::{
    AssignmentAudit, GroupDeletion, GroupSetOutcome, MembershipOutcome, OverrideOutcome,
    ProvisionReport, PruneOutcome, RemovalOutcome, StudentAssignmentReport, UploadOutcome,
};

fn heading(title: &str, count: usize) -> String {
    let mut output = format!("{title} ({count})\n");
    output.push_str(&"-".repeat(40));
    output
}

fn summary(done: usize, skipped: usize, failed: usize) -> String {
    format!("\n\n{done} done, {skipped} skipped, {failed} failed")
}

fn format_entries(entries: &[RosterEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let id = if e.id.is_empty() { "no id" } else { e.id.as_str() };
            format!("\n  {} ({id})", e.name)
        })
        .collect()
}

/// Format a roster reconciliation.
pub fn format_roster_diff(diff: &RosterDiff) -> String {
    if diff.is_reconciled() {
        return "Roster and sheet match.".to_string();
    }
    let mut output = String::new();
    if !diff.missing_from_platform.is_empty() {
        output.push_str(&heading("NOT ENROLLED", diff.missing_from_platform.len()));
        output.push_str(&format_entries(&diff.missing_from_platform));
    }
    if !diff.missing_from_external.is_empty() {
        if !output.is_empty() {
            output.push_str("\n\n");
        }
        output.push_str(&heading("NOT IN SHEET", diff.missing_from_external.len()));
        output.push_str(&format_entries(&diff.missing_from_external));
    }
    output
}

/// Format assignments for display.
pub fn format_assignments(assignments: &[Assignment]) -> String {
    if assignments.is_empty() {
        return "No assignments found.".to_string();
    }
    let mut output = heading("ASSIGNMENTS", assignments.len());
    for a in assignments {
        let state = if a.published { "published" } else { "unpublished" };
        output.push_str(&format!("\n{} [{}]\n  ID: {}", a.name, state, a.id));
        if let Some(due) = a.due_at {
            output.push_str(&format!("\n  Due: {}", due.format("%Y-%m-%d %H:%M UTC")));
        }
    }
    output
}

/// Format override creation outcomes.
pub fn format_override_outcomes(outcomes: &[OverrideOutcome]) -> String {
    let (mut done, mut skipped, mut failed) = (0, 0, 0);
    let mut output = heading("OVERRIDES", outcomes.len());
    for outcome in outcomes {
        let line = match outcome {
            OverrideOutcome::Created {
                assignment_id,
                subject,
                due_at,
                ..
            } => {
                done += 1;
                format!("created  {subject} on {assignment_id}, due {}", format_event_time(*due_at))
            }
            OverrideOutcome::Skipped { subject, reason } => {
                skipped += 1;
                format!("skipped  {subject}: {reason}")
            }
            OverrideOutcome::Failed {
                assignment_id,
                subject,
                error,
            } => {
                failed += 1;
                format!("FAILED   {subject} on {assignment_id}: {error}")
            }
        };
        output.push_str(&format!("\n{line}"));
    }
    output.push_str(&summary(done, skipped, failed));
    output
}

/// Format the result of assigning students from a sheet.
pub fn format_student_report(report: &StudentAssignmentReport) -> String {
    match report {
        StudentAssignmentReport::EnrollmentMismatch(diff) => format!(
            "Enrollment mismatch, nothing assigned.\n\n{}",
            format_roster_diff(diff)
        ),
        StudentAssignmentReport::Completed { outcomes } => format_override_outcomes(outcomes),
    }
}

/// Format override deletions.
pub fn format_prune_outcomes(outcomes: &[PruneOutcome]) -> String {
    if outcomes.is_empty() {
        return "No overrides to delete.".to_string();
    }
    let mut failed = 0;
    let mut output = heading("DELETED OVERRIDES", outcomes.len());
    for outcome in outcomes {
        match outcome {
            PruneOutcome::Deleted {
                assignment_id,
                override_id,
            } => output.push_str(&format!("\ndeleted  {override_id} on {assignment_id}")),
            PruneOutcome::Failed {
                assignment_id,
                override_id,
                error,
            } => {
                failed += 1;
                output.push_str(&format!("\nFAILED   {override_id} on {assignment_id}: {error}"));
            }
        }
    }
    output.push_str(&summary(outcomes.len() - failed, 0, failed));
    output
}

/// Format assignment audits.
pub fn format_audits(audits: &[AssignmentAudit]) -> String {
    let mut output = String::new();
    for audit in audits {
        if !output.is_empty() {
            output.push_str("\n\n");
        }
        if audit.unassigned.is_empty() {
            output.push_str(&format!("{}: every student assigned", audit.assignment_name));
        } else {
            output.push_str(&heading(&audit.assignment_name, audit.unassigned.len()));
            output.push_str(&format_entries(&audit.unassigned));
        }
    }
    output
}

/// Format group sets for display.
pub fn format_group_sets(sets: &[GroupSet]) -> String {
    if sets.is_empty() {
        return "No group sets found.".to_string();
    }
    let mut output = heading("GROUP SETS", sets.len());
    for set in sets {
        output.push_str(&format!("\n{}\n  ID: {}", set.name, set.id));
    }
    output
}

/// Format groups for display.
pub fn format_groups(groups: &[Group]) -> String {
    if groups.is_empty() {
        return "No groups found.".to_string();
    }
    let mut output = heading("GROUPS", groups.len());
    for group in groups {
        output.push_str(&format!("\n{}\n  ID: {}", group.name, group.id));
    }
    output
}

/// Format group set creation outcomes.
pub fn format_group_set_outcomes(outcomes: &[GroupSetOutcome]) -> String {
    let mut output = heading("GROUP SETS", outcomes.len());
    for outcome in outcomes {
        let line = match outcome {
            GroupSetOutcome::Created(set) => format!("created  {} ({})", set.name, set.id),
            GroupSetOutcome::AlreadyExists(set) => format!("exists   {} ({})", set.name, set.id),
            GroupSetOutcome::Failed { name, error } => format!("FAILED   {name}: {error}"),
        };
        output.push_str(&format!("\n{line}"));
    }
    output
}

/// Format group provisioning, one block per group set.
pub fn format_provision_reports(reports: &BTreeMap<u64, ProvisionReport>) -> String {
    let mut blocks = Vec::new();
    for (set_id, report) in reports {
        let mut block = format!("Group set {set_id}");
        for group in &report.created {
            block.push_str(&format!("\n  created  {} ({})", group.name, group.id));
        }
        for name in &report.existing {
            block.push_str(&format!("\n  exists   {name}"));
        }
        for failure in &report.failed {
            block.push_str(&format!("\n  FAILED   {}: {}", failure.item, failure.error));
        }
        blocks.push(block);
    }
    blocks.join("\n\n")
}

/// Format group deletions.
pub fn format_group_deletions(outcomes: &[GroupDeletion]) -> String {
    if outcomes.is_empty() {
        return "No groups to delete.".to_string();
    }
    let mut output = heading("DELETED GROUPS", outcomes.len());
    for outcome in outcomes {
        let line = match outcome {
            GroupDeletion::Deleted { group_id, name } => format!("deleted  {name} ({group_id})"),
            GroupDeletion::Failed { name, error, .. } => format!("FAILED   {name}: {error}"),
        };
        output.push_str(&format!("\n{line}"));
    }
    output
}

/// Format membership outcomes.
pub fn format_membership_outcomes(outcomes: &[MembershipOutcome]) -> String {
    let (mut done, mut skipped, mut failed) = (0, 0, 0);
    let mut output = heading("MEMBERSHIPS", outcomes.len());
    for outcome in outcomes {
        let line = match outcome {
            MembershipOutcome::Added {
                student,
                group_set,
                group_name,
                ..
            } => {
                done += 1;
                format!("added    {student} to {group_name} ({group_set})")
            }
            MembershipOutcome::Skipped { student, reason } => {
                skipped += 1;
                format!("skipped  {student}: {reason}")
            }
            MembershipOutcome::Failed {
                student,
                group_name,
                error,
            } => {
                failed += 1;
                format!("FAILED   {student} to {group_name}: {error}")
            }
        };
        output.push_str(&format!("\n{line}"));
    }
    output.push_str(&summary(done, skipped, failed));
    output
}

/// Format an event for display.
pub fn format_event(event: &CalendarEvent) -> String {
    let mut output = format!("{}\n  ID: {}", event.title, event.id);
    if let Some(start) = event.naive_start() {
        output.push_str(&format!("\n  Start: {}", format_event_time(start)));
    }
    if let Some(end) = event.naive_end() {
        output.push_str(&format!("\n  End: {}", format_event_time(end)));
    }
    if let Some(location) = &event.location_name {
        output.push_str(&format!("\n  Location: {location}"));
    }
    if let Some(description) = &event.description {
        output.push_str(&format!("\n  Description: {description}"));
    }
    output
}

/// Format events for display.
pub fn format_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }
    let mut output = heading("EVENTS", events.len());
    for event in events {
        output.push_str(&format!("\n{}", format_event(event)));
    }
    output
}

/// Format schedule upload outcomes.
pub fn format_upload_outcomes(outcomes: &[UploadOutcome]) -> String {
    let (mut done, mut skipped, mut failed) = (0, 0, 0);
    let mut output = heading("UPLOAD", outcomes.len());
    for outcome in outcomes {
        let line = match outcome {
            UploadOutcome::Created { title, at, .. } => {
                done += 1;
                format!("created  {title} at {at}")
            }
            UploadOutcome::Conflict {
                title,
                at,
                conflicting,
            } => {
                skipped += 1;
                format!("conflict {title} on {at} overlaps {}", conflicting.join(", "))
            }
            UploadOutcome::Rejected {
                title,
                status,
                payload,
            } => {
                failed += 1;
                let status = match status {
                    Some(code) => code.to_string(),
                    None => "no response".to_string(),
                };
                format!("FAILED   {title} ({status}): {payload}")
            }
        };
        output.push_str(&format!("\n{line}"));
    }
    output.push_str(&summary(done, skipped, failed));
    output
}

/// Format event removals.
pub fn format_removal_outcomes(outcomes: &[RemovalOutcome]) -> String {
    if outcomes.is_empty() {
        return "No events to delete.".to_string();
    }
    let mut output = heading("DELETED EVENTS", outcomes.len());
    for outcome in outcomes {
        let line = match outcome {
            RemovalOutcome::Deleted { title, at, .. } => format!("deleted  {title} {at}"),
            RemovalOutcome::Failed {
                title, at, error, ..
            } => format!("FAILED   {title} {at}: {error}"),
        };
        output.push_str(&format!("\n{line}"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursesync_core::overrides::SkipReason;

    #[test]
    fn test_reconciled_roster() {
        assert_eq!(
            format_roster_diff(&RosterDiff::default()),
            "Roster and sheet match."
        );
    }

    #[test]
    fn test_roster_diff_lists_both_sides() {
        let diff = RosterDiff {
            missing_from_platform: vec![RosterEntry {
                id: "300".to_string(),
                name: "Cy".to_string(),
            }],
            missing_from_external: vec![],
        };

        let output = format_roster_diff(&diff);

        assert!(output.starts_with("NOT ENROLLED (1)"));
        assert!(output.contains("Cy (300)"));
        assert!(!output.contains("NOT IN SHEET"));
    }

    #[test]
    fn test_roster_diff_marks_missing_ids() {
        let diff = RosterDiff {
            missing_from_platform: vec![],
            missing_from_external: vec![RosterEntry {
                id: String::new(),
                name: "Hopper, Grace".to_string(),
            }],
        };

        assert!(format_roster_diff(&diff).contains("Hopper, Grace (no id)"));
    }

    #[test]
    fn test_membership_summary_counts() {
        let outcomes = vec![
            MembershipOutcome::Added {
                student: "Ada".to_string(),
                group_set: "Labs".to_string(),
                group_name: "Lab A".to_string(),
                membership_id: 1,
            },
            MembershipOutcome::Skipped {
                student: "Cy".to_string(),
                reason: SkipReason::UnknownGroup {
                    scope: "Labs".to_string(),
                    group: "Lab Z".to_string(),
                },
            },
        ];

        let output = format_membership_outcomes(&outcomes);

        assert!(output.contains("skipped  Cy: group 'Lab Z' not found in 'Labs'"));
        assert!(output.ends_with("1 done, 1 skipped, 0 failed"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(format_events(&[]), "No events found.");
        assert_eq!(format_group_sets(&[]), "No group sets found.");
        assert_eq!(format_prune_outcomes(&[]), "No overrides to delete.");
    }
}
