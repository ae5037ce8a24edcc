//! Planning of assignment due-date overrides.
//!
//! Turns student sheets and practical timetables into the list of overrides to
//! create. Every lookup miss becomes a [`SkipReason`] on the affected item instead
//! of an error, so one bad cell never blocks the rest of a run.
//!
//! This is part of the Functional Core - all functions are pure with no side effects.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::course::{AssignmentOverride, EnrollmentRecord, PracticalScheduleRow, StudentRow};
use crate::groups::GroupIndex;
use crate::roster::normalize_identifier;
use crate::serde::parse_moment;

/// Stable external id -> platform user id.
///
/// Built from the roster fetched at the start of an operation and only valid for
/// that operation: enrollments may change between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMapping {
    ids: HashMap<String, u64>,
}

impl IdentifierMapping {
    /// Builds the mapping. Records without an external id are ignored; a repeated
    /// external id keeps the last platform id seen.
    pub fn from_roster(roster: &[EnrollmentRecord]) -> Self {
        let ids = roster
            .iter()
            .filter_map(|r| {
                r.stable_external_id
                    .as_deref()
                    .map(|id| (normalize_identifier(id), r.platform_user_id))
            })
            .collect();
        Self { ids }
    }

    pub fn resolve(&self, external_id: &str) -> PlatformUserRef {
        self.ids
            .get(&normalize_identifier(external_id))
            .copied()
            .map_or(PlatformUserRef::Unresolved, PlatformUserRef::Resolved)
    }
}

/// The platform identity of a sheet student.
///
/// `Unresolved` marks a student with no enrollment; it never reaches a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformUserRef {
    Resolved(u64),
    Unresolved,
}

impl PlatformUserRef {
    pub fn id(&self) -> Option<u64> {
        match self {
            PlatformUserRef::Resolved(id) => Some(*id),
            PlatformUserRef::Unresolved => None,
        }
    }
}

/// A sheet row with its external id resolved against the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStudentRow {
    pub user: PlatformUserRef,
    pub row: StudentRow,
}

/// Resolves every row's external id. Rows without a mapping are kept as
/// [`PlatformUserRef::Unresolved`].
pub fn remap_student_table(rows: &[StudentRow], mapping: &IdentifierMapping) -> Vec<MappedStudentRow> {
    rows.iter()
        .map(|row| MappedStudentRow {
            user: mapping.resolve(&row.external_id),
            row: row.clone(),
        })
        .collect()
}

/// Why a single planned item was not turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    UnresolvedStudent { external_id: String, name: String },
    UnknownAssignmentCode { code: String },
    InvalidDueDate { label: String },
    AssignmentNotNamed { assignment_id: u64 },
    NoPracticalForAssignment { assignment: String },
    NoScheduleForPractical { practical: String },
    UnknownGroup { scope: String, group: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnresolvedStudent { external_id, name } => {
                write!(f, "student {name} ({external_id}) is not enrolled on the platform")
            }
            SkipReason::UnknownAssignmentCode { code } => {
                write!(f, "assignment code '{code}' is not mapped to an assignment")
            }
            SkipReason::InvalidDueDate { label } => {
                write!(f, "column '{label}' does not give a valid due date")
            }
            SkipReason::AssignmentNotNamed { assignment_id } => {
                write!(f, "assignment {assignment_id} has no name in the assignment map")
            }
            SkipReason::NoPracticalForAssignment { assignment } => {
                write!(f, "no practical maps to assignment '{assignment}'")
            }
            SkipReason::NoScheduleForPractical { practical } => {
                write!(f, "practical '{practical}' has no timetable row")
            }
            SkipReason::UnknownGroup { scope, group } => {
                write!(f, "group '{group}' not found in '{scope}'")
            }
        }
    }
}

/// Combines a date and optional time into a due instant `offset_days` later.
/// A missing time falls back to `default_time`.
///
/// Returns `None` when the offset leaves the representable calendar.
pub fn schedule_due_date(
    date: NaiveDate,
    time: Option<NaiveTime>,
    offset_days: i64,
    default_time: NaiveTime,
) -> Option<NaiveDateTime> {
    let due = date.checked_add_signed(Duration::try_days(offset_days)?)?;
    Some(due.and_time(time.unwrap_or(default_time)))
}

/// One student override to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentOverridePlan {
    pub student_id: u64,
    pub student_name: String,
    pub assignment_id: u64,
    pub due_at: NaiveDateTime,
}

/// An item of an individual-override plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StudentPlanItem {
    Assign(StudentOverridePlan),
    Skip { student: String, reason: SkipReason },
}

/// Plans per-student overrides from a wide sheet whose column labels are due
/// dates and whose cells are assignment codes.
///
/// Blank cells are ignored. A date-only label is due at `default_time`.
pub fn plan_student_overrides(
    rows: &[MappedStudentRow],
    assignment_codes: &HashMap<String, u64>,
    default_time: NaiveTime,
) -> Vec<StudentPlanItem> {
    let mut plan = Vec::new();
    for mapped in rows {
        let student = mapped.row.name.clone();
        for (label, code) in &mapped.row.cells {
            let code = code.trim();
            if code.is_empty() {
                continue;
            }
            let Some(student_id) = mapped.user.id() else {
                plan.push(StudentPlanItem::Skip {
                    student: student.clone(),
                    reason: SkipReason::UnresolvedStudent {
                        external_id: mapped.row.external_id.clone(),
                        name: student.clone(),
                    },
                });
                continue;
            };
            let Some(&assignment_id) = assignment_codes.get(code) else {
                plan.push(StudentPlanItem::Skip {
                    student: student.clone(),
                    reason: SkipReason::UnknownAssignmentCode {
                        code: code.to_string(),
                    },
                });
                continue;
            };
            let Some(due_at) = parse_moment(label)
                .and_then(|(date, time)| schedule_due_date(date, time, 0, default_time))
            else {
                plan.push(StudentPlanItem::Skip {
                    student: student.clone(),
                    reason: SkipReason::InvalidDueDate {
                        label: label.clone(),
                    },
                });
                continue;
            };
            plan.push(StudentPlanItem::Assign(StudentOverridePlan {
                student_id,
                student_name: student.clone(),
                assignment_id,
                due_at,
            }));
        }
    }
    plan
}

/// Inputs for planning group overrides from a practical timetable.
#[derive(Debug, Clone)]
pub struct GroupScheduleInput<'a> {
    pub assignment_ids: &'a [u64],
    /// Assignment id -> assignment name.
    pub assignment_names: &'a HashMap<u64, String>,
    /// Practical name -> assignment name.
    pub practical_to_assignment: &'a HashMap<String, String>,
    /// Practical name -> group name -> group id.
    pub groups: &'a GroupIndex<String>,
    pub schedule: &'a [PracticalScheduleRow],
    pub offset_days: i64,
    pub default_time: NaiveTime,
}

/// One group override to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOverridePlan {
    pub assignment_id: u64,
    pub practical: String,
    pub group_name: String,
    pub group_id: u64,
    pub due_at: NaiveDateTime,
}

/// An item of a group-override plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GroupPlanItem {
    Assign(GroupOverridePlan),
    Skip { assignment_id: u64, reason: SkipReason },
}

/// Plans group overrides: each assignment is traced back to its practical, and
/// every dated cell of that practical's timetable row yields an override for the
/// scheduled group, due `offset_days` after the session.
pub fn plan_group_overrides(input: &GroupScheduleInput<'_>) -> Vec<GroupPlanItem> {
    let mut plan = Vec::new();
    for &assignment_id in input.assignment_ids {
        let skip = |reason| GroupPlanItem::Skip {
            assignment_id,
            reason,
        };

        let Some(assignment) = input.assignment_names.get(&assignment_id) else {
            plan.push(skip(SkipReason::AssignmentNotNamed { assignment_id }));
            continue;
        };
        let Some(practical) = input
            .practical_to_assignment
            .iter()
            .find(|(_, name)| *name == assignment)
            .map(|(practical, _)| practical)
        else {
            plan.push(skip(SkipReason::NoPracticalForAssignment {
                assignment: assignment.clone(),
            }));
            continue;
        };
        let Some(row) = input.schedule.iter().find(|r| &r.practical == practical) else {
            plan.push(skip(SkipReason::NoScheduleForPractical {
                practical: practical.clone(),
            }));
            continue;
        };

        for (label, group_name) in &row.cells {
            let group_name = group_name.trim();
            if group_name.is_empty() {
                continue;
            }
            let Some(due_at) = parse_moment(label).and_then(|(date, time)| {
                schedule_due_date(date, time, input.offset_days, input.default_time)
            }) else {
                plan.push(skip(SkipReason::InvalidDueDate {
                    label: label.clone(),
                }));
                continue;
            };
            let Some(group_id) = input.groups.lookup(practical, group_name) else {
                plan.push(skip(SkipReason::UnknownGroup {
                    scope: practical.clone(),
                    group: group_name.to_string(),
                }));
                continue;
            };
            plan.push(GroupPlanItem::Assign(GroupOverridePlan {
                assignment_id,
                practical: practical.clone(),
                group_name: group_name.to_string(),
                group_id,
                due_at,
            }));
        }
    }
    plan
}

/// Roster members not named by any student override of an assignment.
///
/// Group and section overrides name no students and contribute nothing.
pub fn unassigned_students<'a>(
    roster: &'a [EnrollmentRecord],
    overrides: &[AssignmentOverride],
) -> Vec<&'a EnrollmentRecord> {
    let assigned: HashSet<u64> = overrides
        .iter()
        .flat_map(|o| o.target.student_ids().iter().copied())
        .collect();
    roster
        .iter()
        .filter(|r| !assigned.contains(&r.platform_user_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::OverrideTarget;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eod() -> NaiveTime {
        NaiveTime::from_hms_opt(23, 59, 0).unwrap()
    }

    fn roster() -> Vec<EnrollmentRecord> {
        vec![
            EnrollmentRecord::new(11, "100", "Ada"),
            EnrollmentRecord::new(12, "200", "Bob"),
            EnrollmentRecord::new(13, "300", "Cy"),
        ]
    }

    #[test]
    fn test_mapping_resolves_normalized_ids() {
        let mapping = IdentifierMapping::from_roster(&roster());
        assert_eq!(mapping.resolve("100"), PlatformUserRef::Resolved(11));
        assert_eq!(mapping.resolve("200.0"), PlatformUserRef::Resolved(12));
        assert_eq!(mapping.resolve("999"), PlatformUserRef::Unresolved);
    }

    #[test]
    fn test_mapping_last_write_wins() {
        let mut records = roster();
        records.push(EnrollmentRecord::new(99, "100", "Ada again"));
        let mapping = IdentifierMapping::from_roster(&records);
        assert_eq!(mapping.resolve("100"), PlatformUserRef::Resolved(99));
    }

    #[test]
    fn test_remap_marks_unmapped_rows_unresolved() {
        let mapping = IdentifierMapping::from_roster(&roster());
        let rows = vec![StudentRow::new("100", "Ada"), StudentRow::new("404", "Ghost")];

        let mapped = remap_student_table(&rows, &mapping);

        assert_eq!(mapped[0].user, PlatformUserRef::Resolved(11));
        assert_eq!(mapped[1].user, PlatformUserRef::Unresolved);
        assert_eq!(mapped[1].user.id(), None);
    }

    #[test]
    fn test_schedule_due_date_offset() {
        let practical = date(2024, 3, 4);
        let time = NaiveTime::from_hms_opt(14, 0, 0);

        assert_eq!(
            schedule_due_date(practical, time, 7, eod()),
            date(2024, 3, 11).and_hms_opt(14, 0, 0)
        );
        assert_eq!(
            schedule_due_date(practical, None, 7, eod()),
            Some(date(2024, 3, 11).and_time(eod()))
        );
    }

    #[test]
    fn test_schedule_due_date_out_of_range_offset() {
        let practical = date(2024, 3, 4);

        assert_eq!(schedule_due_date(practical, None, 100_000_000, eod()), None);
        assert_eq!(schedule_due_date(practical, None, i64::MIN, eod()), None);
    }

    #[test]
    fn test_plan_student_overrides() {
        let mapping = IdentifierMapping::from_roster(&roster());
        let rows = vec![
            StudentRow::new("100", "Ada")
                .with_cell("2024-03-04", "P1")
                .with_cell("2024-03-11 09:00", "P2")
                .with_cell("2024-03-18", ""),
            StudentRow::new("404", "Ghost").with_cell("2024-03-04", "P1"),
            StudentRow::new("200", "Bob").with_cell("2024-03-04", "P9"),
        ];
        let mapped = remap_student_table(&rows, &mapping);
        let codes = HashMap::from([("P1".to_string(), 501), ("P2".to_string(), 502)]);

        let plan = plan_student_overrides(&mapped, &codes, eod());

        assert_eq!(plan.len(), 4);
        assert_eq!(
            plan[0],
            StudentPlanItem::Assign(StudentOverridePlan {
                student_id: 11,
                student_name: "Ada".to_string(),
                assignment_id: 501,
                due_at: date(2024, 3, 4).and_time(eod()),
            })
        );
        assert!(matches!(
            &plan[1],
            StudentPlanItem::Assign(p) if p.due_at == date(2024, 3, 11).and_hms_opt(9, 0, 0).unwrap()
        ));
        assert!(matches!(
            &plan[2],
            StudentPlanItem::Skip { reason: SkipReason::UnresolvedStudent { .. }, .. }
        ));
        assert!(matches!(
            &plan[3],
            StudentPlanItem::Skip { reason: SkipReason::UnknownAssignmentCode { code }, .. } if code == "P9"
        ));
    }

    #[test]
    fn test_plan_group_overrides() {
        let assignment_ids = [501, 502, 503];
        let assignment_names = HashMap::from([
            (501, "Titration report".to_string()),
            (502, "Distillation report".to_string()),
        ]);
        let practical_to_assignment = HashMap::from([
            ("Titration".to_string(), "Titration report".to_string()),
            ("Distillation".to_string(), "Distillation report".to_string()),
        ]);
        let mut groups = GroupIndex::new();
        groups.insert("Titration".to_string(), "Group 1", 71);
        groups.insert("Titration".to_string(), "Group 2", 72);
        let schedule = vec![
            PracticalScheduleRow::new("Titration")
                .with_cell("2024-03-04", "Group 1")
                .with_cell("2024-03-05", "Group 2")
                .with_cell("2024-03-06", "Group 9")
                .with_cell("2024-03-07", ""),
        ];
        let input = GroupScheduleInput {
            assignment_ids: &assignment_ids,
            assignment_names: &assignment_names,
            practical_to_assignment: &practical_to_assignment,
            groups: &groups,
            schedule: &schedule,
            offset_days: 7,
            default_time: eod(),
        };

        let plan = plan_group_overrides(&input);

        let assigned: Vec<_> = plan
            .iter()
            .filter_map(|item| match item {
                GroupPlanItem::Assign(p) => Some((p.group_id, p.due_at)),
                GroupPlanItem::Skip { .. } => None,
            })
            .collect();
        assert_eq!(
            assigned,
            vec![
                (71, date(2024, 3, 11).and_time(eod())),
                (72, date(2024, 3, 12).and_time(eod())),
            ]
        );

        let skipped: Vec<_> = plan
            .iter()
            .filter_map(|item| match item {
                GroupPlanItem::Skip { assignment_id, reason } => Some((*assignment_id, reason.clone())),
                GroupPlanItem::Assign(_) => None,
            })
            .collect();
        assert_eq!(skipped.len(), 3);
        assert!(matches!(skipped[0], (501, SkipReason::UnknownGroup { .. })));
        assert!(matches!(skipped[1], (502, SkipReason::NoScheduleForPractical { .. })));
        assert!(matches!(skipped[2], (503, SkipReason::AssignmentNotNamed { .. })));
    }

    #[test]
    fn test_plan_group_overrides_skips_unreachable_due_date() {
        let assignment_ids = [501];
        let assignment_names = HashMap::from([(501, "Titration report".to_string())]);
        let practical_to_assignment =
            HashMap::from([("Titration".to_string(), "Titration report".to_string())]);
        let mut groups = GroupIndex::new();
        groups.insert("Titration".to_string(), "Group 1", 71);
        let schedule = vec![PracticalScheduleRow::new("Titration").with_cell("2024-03-04", "Group 1")];
        let input = GroupScheduleInput {
            assignment_ids: &assignment_ids,
            assignment_names: &assignment_names,
            practical_to_assignment: &practical_to_assignment,
            groups: &groups,
            schedule: &schedule,
            offset_days: 100_000_000,
            default_time: eod(),
        };

        let plan = plan_group_overrides(&input);

        assert_eq!(plan.len(), 1);
        assert!(matches!(
            &plan[0],
            GroupPlanItem::Skip { assignment_id: 501, reason: SkipReason::InvalidDueDate { label } }
                if label == "2024-03-04"
        ));
    }

    #[test]
    fn test_unassigned_students_ignores_group_overrides() {
        let roster = roster();
        let overrides = vec![
            AssignmentOverride {
                id: 1,
                assignment_id: 501,
                target: OverrideTarget::Students(vec![11]),
                due_at: None,
                title: None,
            },
            AssignmentOverride {
                id: 2,
                assignment_id: 501,
                target: OverrideTarget::Group(71),
                due_at: None,
                title: None,
            },
            AssignmentOverride {
                id: 3,
                assignment_id: 501,
                target: OverrideTarget::Students(vec![11, 13]),
                due_at: None,
                title: None,
            },
        ];

        let missing = unassigned_students(&roster, &overrides);

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].platform_user_id, 12);
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::UnknownGroup {
            scope: "Labs".to_string(),
            group: "Lab Z".to_string(),
        };
        assert_eq!(reason.to_string(), "group 'Lab Z' not found in 'Labs'");
    }
}
