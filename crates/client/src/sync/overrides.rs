//! Assignment override synchronization.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use coursesync_core::course::{Assignment, AssignmentOverride, NewOverride, PublishedFilter, StudentRow};
use coursesync_core::overrides::{
    plan_group_overrides, plan_student_overrides, remap_student_table, unassigned_students,
    GroupPlanItem, GroupScheduleInput, IdentifierMapping, SkipReason, StudentPlanItem,
};
use coursesync_core::platform::{AssignmentApi, EnrollmentApi};
use coursesync_core::roster::{reconcile, RosterDiff, RosterEntry};

use super::roster::RosterReconciler;
use crate::error::{OverrideCreationError, Result};

/// Outcome of one planned override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OverrideOutcome {
    Created {
        assignment_id: u64,
        /// Student or group the override targets.
        subject: String,
        override_id: u64,
        due_at: NaiveDateTime,
    },
    Skipped {
        subject: String,
        reason: SkipReason,
    },
    Failed {
        assignment_id: u64,
        subject: String,
        error: String,
    },
}

/// Result of assigning students from a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudentAssignmentReport {
    /// The sheet and the roster disagree; nothing was assigned.
    EnrollmentMismatch(RosterDiff),
    Completed { outcomes: Vec<OverrideOutcome> },
}

/// Outcome of deleting one override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PruneOutcome {
    Deleted {
        assignment_id: u64,
        override_id: u64,
    },
    Failed {
        assignment_id: u64,
        override_id: u64,
        error: String,
    },
}

/// Students with no individual override on an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentAudit {
    pub assignment_id: u64,
    pub assignment_name: String,
    pub unassigned: Vec<RosterEntry>,
}

/// Creates, removes and audits assignment overrides.
pub struct OverrideSynchronizer<'a, P: ?Sized> {
    platform: &'a P,
    default_due_time: NaiveTime,
}

impl<'a, P: AssignmentApi + EnrollmentApi + ?Sized> OverrideSynchronizer<'a, P> {
    /// `default_due_time` applies to due dates given without a time of day.
    pub fn new(platform: &'a P, default_due_time: NaiveTime) -> Self {
        Self {
            platform,
            default_due_time,
        }
    }

    pub async fn list_assignments(&self, filter: PublishedFilter) -> Result<Vec<Assignment>> {
        let assignments = self.platform.list_assignments().await?;
        Ok(assignments
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect())
    }

    /// Gives one student an individual due date on an assignment.
    pub async fn assign_individual(
        &self,
        student_id: u64,
        assignment_id: u64,
        due_at: NaiveDateTime,
    ) -> std::result::Result<AssignmentOverride, OverrideCreationError> {
        let request = NewOverride::for_student(student_id, due_at);
        match self.platform.create_override(assignment_id, &request).await {
            Ok(created) => {
                tracing::info!(
                    assignment_id,
                    student_id,
                    due_at = %request.due_at_string(),
                    "Assigned student"
                );
                Ok(created)
            }
            Err(e) => {
                tracing::error!(assignment_id, student_id, error = %e, "Failed to assign student");
                Err(OverrideCreationError {
                    assignment_id,
                    student_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Assigns students to assignments from a wide sheet.
    ///
    /// Each cell is labelled with a due date and holds an assignment code looked
    /// up in `assignment_codes`. With `check_enrollment` the sheet must match the
    /// roster exactly, otherwise nothing is created.
    pub async fn assign_students(
        &self,
        rows: &[StudentRow],
        assignment_codes: &HashMap<String, u64>,
        check_enrollment: bool,
    ) -> Result<StudentAssignmentReport> {
        let roster = RosterReconciler::new(self.platform).fetch_roster().await?;
        if check_enrollment {
            let diff = reconcile(&roster, rows);
            if !diff.is_reconciled() {
                tracing::warn!(
                    missing_from_platform = diff.missing_from_platform.len(),
                    missing_from_sheet = diff.missing_from_external.len(),
                    "Enrollment mismatch, no overrides created"
                );
                return Ok(StudentAssignmentReport::EnrollmentMismatch(diff));
            }
        }

        let mapping = IdentifierMapping::from_roster(&roster);
        let mapped = remap_student_table(rows, &mapping);
        let plan = plan_student_overrides(&mapped, assignment_codes, self.default_due_time);

        let mut outcomes = Vec::with_capacity(plan.len());
        for item in plan {
            let outcome = match item {
                StudentPlanItem::Skip { student, reason } => {
                    tracing::warn!(%student, %reason, "Skipped");
                    OverrideOutcome::Skipped {
                        subject: student,
                        reason,
                    }
                }
                StudentPlanItem::Assign(plan) => match self
                    .assign_individual(plan.student_id, plan.assignment_id, plan.due_at)
                    .await
                {
                    Ok(created) => OverrideOutcome::Created {
                        assignment_id: plan.assignment_id,
                        subject: plan.student_name,
                        override_id: created.id,
                        due_at: plan.due_at,
                    },
                    Err(e) => OverrideOutcome::Failed {
                        assignment_id: plan.assignment_id,
                        subject: plan.student_name,
                        error: e.reason,
                    },
                },
            };
            outcomes.push(outcome);
        }
        Ok(StudentAssignmentReport::Completed { outcomes })
    }

    /// Creates group overrides from a practical timetable.
    pub async fn assign_by_group_schedule(
        &self,
        input: &GroupScheduleInput<'_>,
    ) -> Vec<OverrideOutcome> {
        let mut outcomes = Vec::new();
        for item in plan_group_overrides(input) {
            let outcome = match item {
                GroupPlanItem::Skip {
                    assignment_id,
                    reason,
                } => {
                    tracing::warn!(assignment_id, %reason, "Skipped");
                    OverrideOutcome::Skipped {
                        subject: format!("assignment {assignment_id}"),
                        reason,
                    }
                }
                GroupPlanItem::Assign(plan) => {
                    let request = NewOverride::for_group(plan.group_id, plan.due_at);
                    match self
                        .platform
                        .create_override(plan.assignment_id, &request)
                        .await
                    {
                        Ok(created) => {
                            tracing::info!(
                                assignment_id = plan.assignment_id,
                                group = %plan.group_name,
                                due_at = %request.due_at_string(),
                                "Assigned group"
                            );
                            OverrideOutcome::Created {
                                assignment_id: plan.assignment_id,
                                subject: plan.group_name,
                                override_id: created.id,
                                due_at: plan.due_at,
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                assignment_id = plan.assignment_id,
                                group = %plan.group_name,
                                error = %e,
                                "Failed to assign group"
                            );
                            OverrideOutcome::Failed {
                                assignment_id: plan.assignment_id,
                                subject: plan.group_name,
                                error: e.to_string(),
                            }
                        }
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Deletes every override of the given assignments.
    pub async fn prune_overrides(&self, assignment_ids: &[u64]) -> Result<Vec<PruneOutcome>> {
        self.prune(assignment_ids, |_| true).await
    }

    /// Deletes only the group overrides of the given assignments.
    pub async fn prune_group_overrides(&self, assignment_ids: &[u64]) -> Result<Vec<PruneOutcome>> {
        self.prune(assignment_ids, |o| o.target.is_group()).await
    }

    async fn prune(
        &self,
        assignment_ids: &[u64],
        keep: impl Fn(&AssignmentOverride) -> bool,
    ) -> Result<Vec<PruneOutcome>> {
        let mut outcomes = Vec::new();
        for &assignment_id in assignment_ids {
            let overrides = self.platform.list_overrides(assignment_id).await?;
            for o in overrides.iter().filter(|o| keep(o)) {
                let outcome = match self.platform.delete_override(assignment_id, o.id).await {
                    Ok(()) => {
                        tracing::info!(assignment_id, override_id = o.id, "Deleted override");
                        PruneOutcome::Deleted {
                            assignment_id,
                            override_id: o.id,
                        }
                    }
                    Err(e) => {
                        tracing::error!(assignment_id, override_id = o.id, error = %e, "Failed to delete override");
                        PruneOutcome::Failed {
                            assignment_id,
                            override_id: o.id,
                            error: e.to_string(),
                        }
                    }
                };
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Lists, per assignment, the enrolled students no individual override
    /// targets. Results are ordered by assignment id.
    pub async fn audit_completions(
        &self,
        assignment_names: &HashMap<u64, String>,
    ) -> Result<Vec<AssignmentAudit>> {
        let roster = RosterReconciler::new(self.platform).fetch_roster().await?;
        let mut assignment_ids: Vec<u64> = assignment_names.keys().copied().collect();
        assignment_ids.sort_unstable();

        let mut audits = Vec::with_capacity(assignment_ids.len());
        for assignment_id in assignment_ids {
            let overrides = self.platform.list_overrides(assignment_id).await?;
            let unassigned: Vec<RosterEntry> = unassigned_students(&roster, &overrides)
                .into_iter()
                .map(|r| RosterEntry {
                    id: r.stable_external_id.clone().unwrap_or_default(),
                    name: r.display_name.clone(),
                })
                .collect();
            let assignment_name = assignment_names
                .get(&assignment_id)
                .cloned()
                .unwrap_or_default();
            if unassigned.is_empty() {
                tracing::info!(assignment = %assignment_name, "Every student is assigned");
            } else {
                tracing::warn!(assignment = %assignment_name, count = unassigned.len(), "Students without an override");
            }
            audits.push(AssignmentAudit {
                assignment_id,
                assignment_name,
                unassigned,
            });
        }
        Ok(audits)
    }
}
