use serde::{Deserialize, Serialize};

use crate::serde::deserialize_identifier;

/// Lifecycle state of a course enrollment as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentState {
    Active,
    Invited,
    Inactive,
    Completed,
    Rejected,
    Deleted,
    #[serde(other)]
    Other,
}

/// A student enrollment, flattened from the platform's enrollment payload.
///
/// A student enrolled in several sections of a course appears once per section,
/// so several records may share the same `stable_external_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEnrollment")]
pub struct EnrollmentRecord {
    pub platform_user_id: u64,
    /// Institution-assigned identifier (SIS id / student number).
    pub stable_external_id: Option<String>,
    pub display_name: String,
    pub sortable_name: String,
    pub email: Option<String>,
    pub enrollment_state: EnrollmentState,
    pub course_section_id: Option<u64>,
}

impl EnrollmentRecord {
    /// Creates an active enrollment record.
    pub fn new(
        platform_user_id: u64,
        stable_external_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            platform_user_id,
            stable_external_id: Some(stable_external_id.into()),
            sortable_name: display_name.clone(),
            display_name,
            email: None,
            enrollment_state: EnrollmentState::Active,
            course_section_id: None,
        }
    }

    /// Sets the enrollment state.
    pub fn with_state(mut self, state: EnrollmentState) -> Self {
        self.enrollment_state = state;
        self
    }

    /// Sets the sortable name ("Last, First").
    pub fn with_sortable_name(mut self, sortable_name: impl Into<String>) -> Self {
        self.sortable_name = sortable_name.into();
        self
    }

    /// Sets the course section this enrollment belongs to.
    pub fn with_section(mut self, section_id: u64) -> Self {
        self.course_section_id = Some(section_id);
        self
    }

    pub fn is_inactive(&self) -> bool {
        self.enrollment_state == EnrollmentState::Inactive
    }
}

/// Wire shape of an enrollment: the user is nested.
#[derive(Debug, Deserialize)]
struct RawEnrollment {
    #[serde(default)]
    course_section_id: Option<u64>,
    enrollment_state: EnrollmentState,
    user: RawEnrollmentUser,
}

#[derive(Debug, Deserialize)]
struct RawEnrollmentUser {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sortable_name: String,
    #[serde(default, deserialize_with = "deserialize_identifier")]
    sis_user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<RawEnrollment> for EnrollmentRecord {
    fn from(raw: RawEnrollment) -> Self {
        Self {
            platform_user_id: raw.user.id,
            stable_external_id: raw.user.sis_user_id,
            display_name: raw.user.name,
            sortable_name: raw.user.sortable_name,
            email: raw.user.email,
            enrollment_state: raw.enrollment_state,
            course_section_id: raw.course_section_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_nested_user() {
        let json = r#"{
            "id": 901,
            "user_id": 17,
            "type": "StudentEnrollment",
            "enrollment_state": "active",
            "course_section_id": 61800,
            "user": {
                "id": 17,
                "name": "Ada Lovelace",
                "sortable_name": "Lovelace, Ada",
                "sis_user_id": 40123456
            }
        }"#;

        let record: EnrollmentRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.platform_user_id, 17);
        assert_eq!(record.stable_external_id.as_deref(), Some("40123456"));
        assert_eq!(record.sortable_name, "Lovelace, Ada");
        assert_eq!(record.course_section_id, Some(61800));
        assert_eq!(record.enrollment_state, EnrollmentState::Active);
    }

    #[test]
    fn test_unknown_state_maps_to_other() {
        let json = r#"{
            "enrollment_state": "creation_pending",
            "user": {"id": 3, "name": "X", "sortable_name": "X", "sis_user_id": null}
        }"#;

        let record: EnrollmentRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.enrollment_state, EnrollmentState::Other);
        assert_eq!(record.stable_external_id, None);
    }
}
