//! In-memory platform implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::json;
use tokio::sync::RwLock;

use coursesync_core::calendar::{course_context_code, EventRange};
use coursesync_core::course::{
    Assignment, AssignmentOverride, CalendarEvent, EnrollmentRecord, EventCreation, Group,
    GroupMembership, GroupSet, NewCalendarEvent, NewOverride, OverrideTarget,
};
use coursesync_core::platform::{
    AssignmentApi, CalendarApi, EnrollmentApi, GroupApi, PlatformError, Result,
};

/// A call the platform can be told to refuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePoint {
    ListEnrollments,
    ListAssignments,
    ListOverrides(u64),
    /// Creating any override for this student.
    CreateStudentOverride(u64),
    /// Creating any override for this group.
    CreateGroupOverride(u64),
    DeleteOverride(u64),
    ListGroupSets,
    CreateGroupSet(String),
    ListGroups(u64),
    CreateGroup(String),
    DeleteGroup(u64),
    AddMembership { group_id: u64, user_id: u64 },
    ListEvents,
    /// Creating an event with this title.
    CreateEvent(String),
    DeleteEvent(u64),
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    enrollments: Vec<EnrollmentRecord>,
    assignments: BTreeMap<u64, Assignment>,
    overrides: BTreeMap<u64, AssignmentOverride>,
    group_sets: BTreeMap<u64, GroupSet>,
    groups: BTreeMap<u64, Group>,
    memberships: Vec<GroupMembership>,
    events: BTreeMap<u64, CalendarEvent>,
    failures: Vec<FailurePoint>,
    calls: Vec<String>,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn fails(&self, point: &FailurePoint) -> bool {
        self.failures.contains(point)
    }
}

/// In-memory stand-in for one course on the platform.
///
/// Ids are allocated from a single counter starting at 1. Listing returns
/// records in id order.
#[derive(Debug, Clone)]
pub struct InMemoryPlatform {
    course_id: u64,
    state: Arc<RwLock<State>>,
}

impl InMemoryPlatform {
    /// Creates an empty course.
    pub fn new(course_id: u64) -> Self {
        Self {
            course_id,
            state: Arc::new(RwLock::new(State {
                next_id: 1000,
                ..State::default()
            })),
        }
    }

    /// Makes every subsequent call matching `point` fail with a 500.
    pub async fn fail_on(&self, point: FailurePoint) {
        self.state.write().await.failures.push(point);
    }

    /// Mutating calls issued so far, oldest first.
    pub async fn calls(&self) -> Vec<String> {
        self.state.read().await.calls.clone()
    }

    pub async fn seed_enrollment(&self, record: EnrollmentRecord) {
        self.state.write().await.enrollments.push(record);
    }

    pub async fn seed_assignment(&self, name: &str, published: bool) -> u64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state.assignments.insert(
            id,
            Assignment {
                id,
                name: name.to_string(),
                due_at: None,
                points_possible: None,
                published,
            },
        );
        id
    }

    pub async fn seed_override(&self, assignment_id: u64, target: OverrideTarget) -> u64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state.overrides.insert(
            id,
            AssignmentOverride {
                id,
                assignment_id,
                target,
                due_at: None,
                title: None,
            },
        );
        id
    }

    pub async fn seed_group_set(&self, name: &str) -> u64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state.group_sets.insert(
            id,
            GroupSet {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    pub async fn seed_group(&self, group_set_id: u64, name: &str) -> u64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        state.groups.insert(
            id,
            Group {
                id,
                group_set_id,
                name: name.to_string(),
            },
        );
        id
    }

    pub async fn seed_event(&self, title: &str, start: NaiveDateTime, end: NaiveDateTime) -> u64 {
        let mut state = self.state.write().await;
        let id = state.allocate_id();
        let event = CalendarEvent {
            id,
            title: title.to_string(),
            description: None,
            start_at: Some(start.and_utc()),
            end_at: Some(end.and_utc()),
            location_name: None,
            context_code: Some(course_context_code(self.course_id)),
        };
        state.events.insert(id, event);
        id
    }

    /// Overrides currently stored for an assignment.
    pub async fn overrides_of(&self, assignment_id: u64) -> Vec<AssignmentOverride> {
        self.state
            .read()
            .await
            .overrides
            .values()
            .filter(|o| o.assignment_id == assignment_id)
            .cloned()
            .collect()
    }

    pub async fn groups_of(&self, group_set_id: u64) -> Vec<Group> {
        self.state
            .read()
            .await
            .groups
            .values()
            .filter(|g| g.group_set_id == group_set_id)
            .cloned()
            .collect()
    }

    pub async fn group_sets(&self) -> Vec<GroupSet> {
        self.state.read().await.group_sets.values().cloned().collect()
    }

    pub async fn memberships(&self) -> Vec<GroupMembership> {
        self.state.read().await.memberships.clone()
    }

    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.state.read().await.events.values().cloned().collect()
    }
}

fn fetch_failure(resource: &str) -> PlatformError {
    PlatformError::Fetch {
        resource: resource.to_string(),
        status: 500,
        body: "injected failure".to_string(),
    }
}

fn mutation_failure(action: String) -> PlatformError {
    PlatformError::Mutation {
        action,
        status: 500,
        body: "injected failure".to_string(),
    }
}

fn not_found(action: String) -> PlatformError {
    PlatformError::Mutation {
        action,
        status: 404,
        body: "not found".to_string(),
    }
}

#[async_trait]
impl EnrollmentApi for InMemoryPlatform {
    async fn list_student_enrollments(&self) -> Result<Vec<EnrollmentRecord>> {
        let state = self.state.read().await;
        if state.fails(&FailurePoint::ListEnrollments) {
            return Err(fetch_failure("enrollments"));
        }
        Ok(state.enrollments.clone())
    }
}

#[async_trait]
impl AssignmentApi for InMemoryPlatform {
    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let state = self.state.read().await;
        if state.fails(&FailurePoint::ListAssignments) {
            return Err(fetch_failure("assignments"));
        }
        Ok(state.assignments.values().cloned().collect())
    }

    async fn list_overrides(&self, assignment_id: u64) -> Result<Vec<AssignmentOverride>> {
        let state = self.state.read().await;
        if state.fails(&FailurePoint::ListOverrides(assignment_id)) {
            return Err(fetch_failure(&format!(
                "overrides of assignment {assignment_id}"
            )));
        }
        Ok(state
            .overrides
            .values()
            .filter(|o| o.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn create_override(
        &self,
        assignment_id: u64,
        request: &NewOverride,
    ) -> Result<AssignmentOverride> {
        let mut state = self.state.write().await;
        state.calls.push(format!(
            "create_override {assignment_id} {:?}",
            request.target
        ));
        let action = format!("create override on assignment {assignment_id}");
        let refused = match &request.target {
            OverrideTarget::Students(ids) => ids
                .iter()
                .any(|id| state.fails(&FailurePoint::CreateStudentOverride(*id))),
            OverrideTarget::Group(id) => state.fails(&FailurePoint::CreateGroupOverride(*id)),
            OverrideTarget::Section(_) | OverrideTarget::Course(_) => false,
        };
        if refused {
            return Err(mutation_failure(action));
        }
        if !state.assignments.contains_key(&assignment_id) {
            return Err(not_found(action));
        }

        let id = state.allocate_id();
        let created = AssignmentOverride {
            id,
            assignment_id,
            target: request.target.clone(),
            due_at: Some(request.due_at.and_utc()),
            title: None,
        };
        state.overrides.insert(id, created.clone());
        Ok(created)
    }

    async fn delete_override(&self, assignment_id: u64, override_id: u64) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("delete_override {assignment_id} {override_id}"));
        let action = format!("delete override {override_id}");
        if state.fails(&FailurePoint::DeleteOverride(override_id)) {
            return Err(mutation_failure(action));
        }
        match state.overrides.get(&override_id) {
            Some(o) if o.assignment_id == assignment_id => {
                state.overrides.remove(&override_id);
                Ok(())
            }
            _ => Err(not_found(action)),
        }
    }
}

#[async_trait]
impl GroupApi for InMemoryPlatform {
    async fn list_group_sets(&self) -> Result<Vec<GroupSet>> {
        let state = self.state.read().await;
        if state.fails(&FailurePoint::ListGroupSets) {
            return Err(fetch_failure("group sets"));
        }
        Ok(state.group_sets.values().cloned().collect())
    }

    async fn create_group_set(&self, name: &str) -> Result<GroupSet> {
        let mut state = self.state.write().await;
        state.calls.push(format!("create_group_set {name}"));
        if state.fails(&FailurePoint::CreateGroupSet(name.to_string())) {
            return Err(mutation_failure(format!("create group set '{name}'")));
        }
        let id = state.allocate_id();
        let set = GroupSet {
            id,
            name: name.to_string(),
        };
        state.group_sets.insert(id, set.clone());
        Ok(set)
    }

    async fn list_groups(&self, group_set_id: u64) -> Result<Vec<Group>> {
        let mut state = self.state.write().await;
        state.calls.push(format!("list_groups {group_set_id}"));
        if state.fails(&FailurePoint::ListGroups(group_set_id)) {
            return Err(fetch_failure(&format!("groups of set {group_set_id}")));
        }
        Ok(state
            .groups
            .values()
            .filter(|g| g.group_set_id == group_set_id)
            .cloned()
            .collect())
    }

    async fn create_group(&self, group_set_id: u64, name: &str) -> Result<Group> {
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("create_group {group_set_id} {name}"));
        let action = format!("create group '{name}'");
        if state.fails(&FailurePoint::CreateGroup(name.to_string())) {
            return Err(mutation_failure(action));
        }
        if !state.group_sets.contains_key(&group_set_id) {
            return Err(not_found(action));
        }
        let id = state.allocate_id();
        let group = Group {
            id,
            group_set_id,
            name: name.to_string(),
        };
        state.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn delete_group(&self, group_id: u64) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(format!("delete_group {group_id}"));
        let action = format!("delete group {group_id}");
        if state.fails(&FailurePoint::DeleteGroup(group_id)) {
            return Err(mutation_failure(action));
        }
        if state.groups.remove(&group_id).is_none() {
            return Err(not_found(action));
        }
        state.memberships.retain(|m| m.group_id != group_id);
        Ok(())
    }

    async fn add_membership(&self, group_id: u64, user_id: u64) -> Result<GroupMembership> {
        let mut state = self.state.write().await;
        state
            .calls
            .push(format!("add_membership {group_id} {user_id}"));
        let action = format!("add user {user_id} to group {group_id}");
        if state.fails(&FailurePoint::AddMembership { group_id, user_id }) {
            return Err(mutation_failure(action));
        }
        if !state.groups.contains_key(&group_id) {
            return Err(not_found(action));
        }
        let id = state.allocate_id();
        let membership = GroupMembership {
            id,
            group_id,
            user_id,
        };
        state.memberships.push(membership.clone());
        Ok(membership)
    }
}

#[async_trait]
impl CalendarApi for InMemoryPlatform {
    async fn list_events(&self, range: EventRange) -> Result<Vec<CalendarEvent>> {
        let state = self.state.read().await;
        if state.fails(&FailurePoint::ListEvents) {
            return Err(fetch_failure("calendar events"));
        }
        Ok(state
            .events
            .values()
            .filter(|event| {
                let Some(day) = event.naive_start().map(|s| s.date()) else {
                    return range.start.is_none() && range.end.is_none();
                };
                range.start.is_none_or(|start| day >= start)
                    && range.end.is_none_or(|end| day <= end)
            })
            .cloned()
            .collect())
    }

    async fn get_event(&self, event_id: u64) -> Result<CalendarEvent> {
        let state = self.state.read().await;
        state.events.get(&event_id).cloned().ok_or_else(|| {
            PlatformError::Fetch {
                resource: format!("calendar event {event_id}"),
                status: 404,
                body: "not found".to_string(),
            }
        })
    }

    async fn create_event(&self, event: &NewCalendarEvent) -> EventCreation {
        let mut state = self.state.write().await;
        state.calls.push(format!("create_event {}", event.title));
        if state.fails(&FailurePoint::CreateEvent(event.title.clone())) {
            return EventCreation::Rejected {
                status: Some(500),
                payload: json!({ "errors": [{ "message": "injected failure" }] }),
            };
        }
        let id = state.allocate_id();
        let created = CalendarEvent {
            id,
            title: event.title.clone(),
            description: Some(event.description.clone()),
            start_at: Some(event.start_at.and_utc()),
            end_at: Some(event.end_at.and_utc()),
            location_name: Some(event.location_name.clone()),
            context_code: Some(event.context_code.clone()),
        };
        state.events.insert(id, created.clone());
        EventCreation::Created(created)
    }

    async fn delete_event(&self, event_id: u64) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(format!("delete_event {event_id}"));
        let action = format!("delete calendar event {event_id}");
        if state.fails(&FailurePoint::DeleteEvent(event_id)) {
            return Err(mutation_failure(action));
        }
        if state.events.remove(&event_id).is_none() {
            return Err(not_found(action));
        }
        Ok(())
    }

    fn context_code(&self) -> String {
        course_context_code(self.course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_override_create_and_delete() {
        let platform = InMemoryPlatform::new(7);
        let assignment = platform.seed_assignment("Report", true).await;

        let created = platform
            .create_override(assignment, &NewOverride::for_student(11, at(4, 23)))
            .await
            .unwrap();
        assert_eq!(platform.list_overrides(assignment).await.unwrap(), vec![created.clone()]);

        platform.delete_override(assignment, created.id).await.unwrap();
        assert!(platform.list_overrides(assignment).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_override_on_unknown_assignment_is_not_found() {
        let platform = InMemoryPlatform::new(7);
        let result = platform
            .create_override(99, &NewOverride::for_student(11, at(4, 23)))
            .await;
        assert_eq!(result.unwrap_err().status(), Some(404));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let platform = InMemoryPlatform::new(7);
        let set = platform.seed_group_set("Labs").await;
        platform.fail_on(FailurePoint::CreateGroup("Lab B".to_string())).await;
        platform.fail_on(FailurePoint::ListEnrollments).await;

        assert!(platform.create_group(set, "Lab A").await.is_ok());
        assert_eq!(
            platform.create_group(set, "Lab B").await.unwrap_err().status(),
            Some(500)
        );
        assert!(platform.list_student_enrollments().await.is_err());
        assert_eq!(platform.groups_of(set).await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_events_by_range() {
        let platform = InMemoryPlatform::new(7);
        platform.seed_event("Mon", at(4, 10), at(4, 11)).await;
        platform.seed_event("Tue", at(5, 10), at(5, 11)).await;

        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let events = platform.list_events(EventRange::day(monday)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Mon");
        assert_eq!(platform.list_events(EventRange::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_event_rejection() {
        let platform = InMemoryPlatform::new(7);
        platform.fail_on(FailurePoint::CreateEvent("Lab".to_string())).await;
        let event = NewCalendarEvent {
            context_code: platform.context_code(),
            title: "Lab".to_string(),
            description: String::new(),
            start_at: at(4, 10),
            end_at: at(4, 11),
            location_name: String::new(),
        };

        let outcome = platform.create_event(&event).await;

        assert!(matches!(outcome, EventCreation::Rejected { status: Some(500), .. }));
        assert!(platform.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_group_drops_memberships() {
        let platform = InMemoryPlatform::new(7);
        let set = platform.seed_group_set("Labs").await;
        let group = platform.seed_group(set, "Lab A").await;
        platform.add_membership(group, 11).await.unwrap();

        platform.delete_group(group).await.unwrap();

        assert!(platform.memberships().await.is_empty());
        assert!(platform.delete_group(group).await.is_err());
    }
}
