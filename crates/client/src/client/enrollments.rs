//! Enrollment API operations.

use async_trait::async_trait;
use coursesync_core::course::EnrollmentRecord;
use coursesync_core::platform::{EnrollmentApi, Result};

use super::CanvasClient;

#[async_trait]
impl EnrollmentApi for CanvasClient {
    async fn list_student_enrollments(&self) -> Result<Vec<EnrollmentRecord>> {
        self.get_paged(
            "enrollments",
            &self.course_url("/enrollments"),
            &[("type[]", "StudentEnrollment".to_string())],
        )
        .await
    }
}
