//! The platform's REST surface, as traits.
//!
//! `coursesync_client` implements these over HTTP and with an in-memory fake.

mod error;
mod traits;

pub use error::{PlatformError, Result};
pub use traits::{AssignmentApi, CalendarApi, EnrollmentApi, GroupApi, Platform};
