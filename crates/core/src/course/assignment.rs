use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::OverrideShapeError;

/// Timestamp format used for naive due dates sent to the platform.
pub const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// An assignment in the course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    #[serde(default)]
    pub published: bool,
}

/// Filter applied when listing assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishedFilter {
    #[default]
    All,
    Published,
    Unpublished,
}

impl PublishedFilter {
    pub fn matches(&self, assignment: &Assignment) -> bool {
        match self {
            PublishedFilter::All => true,
            PublishedFilter::Published => assignment.published,
            PublishedFilter::Unpublished => !assignment.published,
        }
    }
}

/// Who an override applies to. An override targets exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum OverrideTarget {
    Students(Vec<u64>),
    Group(u64),
    Section(u64),
    /// Course-wide ("Everyone") or noop override. Names no students.
    Course(Option<u64>),
}

impl OverrideTarget {
    pub fn is_group(&self) -> bool {
        matches!(self, OverrideTarget::Group(_))
    }

    /// Student ids named by this target. Group and section targets name none.
    pub fn student_ids(&self) -> &[u64] {
        match self {
            OverrideTarget::Students(ids) => ids,
            _ => &[],
        }
    }
}

/// A per-student or per-group exception to an assignment's due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOverride")]
pub struct AssignmentOverride {
    pub id: u64,
    pub assignment_id: u64,
    pub target: OverrideTarget,
    pub due_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
}

impl AssignmentOverride {
    /// True when the override is scoped to individual students.
    pub fn assign_individually(&self) -> bool {
        matches!(self.target, OverrideTarget::Students(_))
    }
}

#[derive(Debug, Deserialize)]
struct RawOverride {
    id: u64,
    assignment_id: u64,
    #[serde(default)]
    student_ids: Option<Vec<u64>>,
    #[serde(default)]
    group_id: Option<u64>,
    #[serde(default)]
    course_section_id: Option<u64>,
    #[serde(default)]
    course_id: Option<u64>,
    #[serde(default)]
    due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    title: Option<String>,
}

impl TryFrom<RawOverride> for AssignmentOverride {
    type Error = OverrideShapeError;

    fn try_from(raw: RawOverride) -> Result<Self, Self::Error> {
        let target = match (raw.student_ids, raw.group_id, raw.course_section_id) {
            (Some(ids), None, None) => OverrideTarget::Students(ids),
            (None, Some(group_id), None) => OverrideTarget::Group(group_id),
            (None, None, Some(section_id)) => OverrideTarget::Section(section_id),
            (None, None, None) => OverrideTarget::Course(raw.course_id),
            _ => return Err(OverrideShapeError::MultipleTargets(raw.id)),
        };
        Ok(Self {
            id: raw.id,
            assignment_id: raw.assignment_id,
            target,
            due_at: raw.due_at,
            title: raw.title,
        })
    }
}

/// Request body for creating an override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOverride {
    pub target: OverrideTarget,
    pub due_at: NaiveDateTime,
}

impl NewOverride {
    /// An override for a single student.
    pub fn for_student(student_id: u64, due_at: NaiveDateTime) -> Self {
        Self {
            target: OverrideTarget::Students(vec![student_id]),
            due_at,
        }
    }

    /// An override for a whole group.
    pub fn for_group(group_id: u64, due_at: NaiveDateTime) -> Self {
        Self {
            target: OverrideTarget::Group(group_id),
            due_at,
        }
    }

    /// Formats the due date the way the platform expects it.
    pub fn due_at_string(&self) -> String {
        self.due_at.format(NAIVE_TIMESTAMP_FORMAT).to_string()
    }

    /// JSON payload for the create-override endpoint.
    pub fn to_payload(&self) -> Value {
        let due_at = self.due_at_string();
        let body = match &self.target {
            OverrideTarget::Students(ids) => json!({ "student_ids": ids, "due_at": due_at }),
            OverrideTarget::Group(id) => json!({ "group_id": id, "due_at": due_at }),
            OverrideTarget::Section(id) => json!({ "course_section_id": id, "due_at": due_at }),
            OverrideTarget::Course(_) => json!({ "due_at": due_at }),
        };
        json!({ "assignment_override": body })
    }
}
