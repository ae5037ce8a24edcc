//! Records exchanged with the platform and read from tabular input.

mod assignment;
mod enrollment;
mod error;
mod event;
mod group;
mod rows;

pub use assignment::{
    Assignment, AssignmentOverride, NewOverride, OverrideTarget, PublishedFilter,
    NAIVE_TIMESTAMP_FORMAT,
};
pub use enrollment::{EnrollmentRecord, EnrollmentState};
pub use error::OverrideShapeError;
pub use event::{CalendarEvent, EventCreation, NewCalendarEvent};
pub use group::{Group, GroupMembership, GroupSet};
pub use rows::{PracticalScheduleRow, ScheduleRow, StudentRow};
