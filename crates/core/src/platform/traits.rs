use async_trait::async_trait;

use crate::calendar::EventRange;
use crate::course::{
    Assignment, AssignmentOverride, CalendarEvent, EnrollmentRecord, EventCreation, Group,
    GroupMembership, GroupSet, NewCalendarEvent, NewOverride,
};

use super::Result;

/// Course enrollments.
#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    /// Lists every student enrollment in the course, all pages, all states.
    async fn list_student_enrollments(&self) -> Result<Vec<EnrollmentRecord>>;
}

/// Assignments and their due-date overrides.
#[async_trait]
pub trait AssignmentApi: Send + Sync {
    /// Lists every assignment in the course.
    async fn list_assignments(&self) -> Result<Vec<Assignment>>;

    /// Lists the overrides of one assignment.
    async fn list_overrides(&self, assignment_id: u64) -> Result<Vec<AssignmentOverride>>;

    /// Creates an override.
    async fn create_override(
        &self,
        assignment_id: u64,
        request: &NewOverride,
    ) -> Result<AssignmentOverride>;

    /// Deletes an override by its own id.
    async fn delete_override(&self, assignment_id: u64, override_id: u64) -> Result<()>;
}

/// Group sets, groups and memberships.
#[async_trait]
pub trait GroupApi: Send + Sync {
    /// Lists the course's group sets.
    async fn list_group_sets(&self) -> Result<Vec<GroupSet>>;

    /// Creates a group set in the course.
    async fn create_group_set(&self, name: &str) -> Result<GroupSet>;

    /// Lists the groups of a group set.
    async fn list_groups(&self, group_set_id: u64) -> Result<Vec<Group>>;

    /// Creates a group in a group set.
    async fn create_group(&self, group_set_id: u64, name: &str) -> Result<Group>;

    /// Deletes a group.
    async fn delete_group(&self, group_id: u64) -> Result<()>;

    /// Adds a user to a group.
    async fn add_membership(&self, group_id: u64, user_id: u64) -> Result<GroupMembership>;
}

/// Course calendar events.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Lists the course's events, optionally bounded by date.
    async fn list_events(&self, range: EventRange) -> Result<Vec<CalendarEvent>>;

    /// Fetches one event.
    async fn get_event(&self, event_id: u64) -> Result<CalendarEvent>;

    /// Creates an event. Never fails: a rejection carries the response body.
    async fn create_event(&self, event: &NewCalendarEvent) -> EventCreation;

    /// Deletes an event.
    async fn delete_event(&self, event_id: u64) -> Result<()>;

    /// Context code of the course the events belong to.
    fn context_code(&self) -> String;
}

/// Everything the synchronizers need from the platform.
pub trait Platform: EnrollmentApi + AssignmentApi + GroupApi + CalendarApi {}

impl<T> Platform for T where T: EnrollmentApi + AssignmentApi + GroupApi + CalendarApi {}
