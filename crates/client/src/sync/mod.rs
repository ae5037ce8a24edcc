//! Synchronizer services: the imperative shell around the core's plans.
//!
//! Each service borrows a platform, fetches fresh state, asks the core what to
//! do and then issues the calls one at a time. Batches never stop at a failed
//! item; every item ends up in the returned report.

pub mod calendar;
pub mod groups;
pub mod overrides;
pub mod roster;

use serde::Serialize;

pub use calendar::{export_to_portable_calendar, CalendarSynchronizer, RemovalOutcome, UploadOutcome};
pub use groups::{
    GroupDeletion, GroupProvisioner, GroupSetOutcome, MembershipOutcome, ProvisionReport,
};
pub use overrides::{
    AssignmentAudit, OverrideOutcome, OverrideSynchronizer, PruneOutcome, StudentAssignmentReport,
};
pub use roster::RosterReconciler;

/// An item of a batch that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub error: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<String>, error: impl ToString) -> Self {
        Self {
            item: item.into(),
            error: error.to_string(),
        }
    }
}
