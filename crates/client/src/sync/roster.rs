//! Roster fetching and reconciliation.

use coursesync_core::course::{EnrollmentRecord, StudentRow};
use coursesync_core::platform::EnrollmentApi;
use coursesync_core::roster::{dedupe_roster, reconcile, RosterDiff};

use crate::error::Result;

/// Compares the course roster with a student sheet.
pub struct RosterReconciler<'a, P: ?Sized> {
    platform: &'a P,
}

impl<'a, P: EnrollmentApi + ?Sized> RosterReconciler<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    /// Student enrollments with inactive ones removed and one record per
    /// student, in the order the platform returned them.
    pub async fn fetch_roster(&self) -> Result<Vec<EnrollmentRecord>> {
        let records = self.platform.list_student_enrollments().await?;
        let fetched = records.len();
        let roster = dedupe_roster(records);
        tracing::info!(fetched, students = roster.len(), "Fetched roster");
        Ok(roster)
    }

    /// Fetches the roster and reconciles it against `students`.
    pub async fn check(&self, students: &[StudentRow]) -> Result<RosterDiff> {
        let roster = self.fetch_roster().await?;
        for record in roster.iter().filter(|r| r.stable_external_id.is_none()) {
            tracing::warn!(
                user_id = record.platform_user_id,
                name = %record.display_name,
                "Enrolled student has no external id"
            );
        }
        let diff = reconcile(&roster, students);
        if diff.is_reconciled() {
            tracing::info!("All students are enrolled");
        } else {
            for entry in &diff.missing_from_platform {
                tracing::warn!(id = %entry.id, name = %entry.name, "Student not enrolled on the platform");
            }
            for entry in &diff.missing_from_external {
                tracing::warn!(id = %entry.id, name = %entry.name, "Enrolled student missing from the sheet");
            }
        }
        Ok(diff)
    }
}
