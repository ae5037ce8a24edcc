//! coursesync_core - Functional core for course administration against an LMS API.
//!
//! Everything in this crate is pure: record types, reconciliation and planning
//! functions, tabular input parsing and calendar file serialization. The platform
//! traits describe the remote API; implementations live in `coursesync_client`.

pub mod calendar;
pub mod course;
pub mod groups;
pub mod ics;
pub mod overrides;
pub mod pagination;
pub mod platform;
pub mod roster;
pub mod serde;
pub mod table;
