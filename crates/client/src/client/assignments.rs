//! Assignment and override API operations.

use async_trait::async_trait;
use coursesync_core::course::{Assignment, AssignmentOverride, NewOverride};
use coursesync_core::platform::{AssignmentApi, Result};

use super::{transport, CanvasClient};

#[async_trait]
impl AssignmentApi for CanvasClient {
    async fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.get_paged("assignments", &self.course_url("/assignments"), &[])
            .await
    }

    async fn list_overrides(&self, assignment_id: u64) -> Result<Vec<AssignmentOverride>> {
        self.get_paged(
            &format!("overrides of assignment {assignment_id}"),
            &self.course_url(&format!("/assignments/{assignment_id}/overrides")),
            &[],
        )
        .await
    }

    async fn create_override(
        &self,
        assignment_id: u64,
        request: &NewOverride,
    ) -> Result<AssignmentOverride> {
        let url = self.course_url(&format!("/assignments/{assignment_id}/overrides"));
        tracing::debug!(%url, "Creating override");
        let response = self
            .post(&url)
            .json(&request.to_payload())
            .send()
            .await
            .map_err(transport)?;
        self.handle_mutation(
            &format!("create override on assignment {assignment_id}"),
            response,
        )
        .await
    }

    async fn delete_override(&self, assignment_id: u64, override_id: u64) -> Result<()> {
        let url = self.course_url(&format!(
            "/assignments/{assignment_id}/overrides/{override_id}"
        ));
        tracing::debug!(%url, "Deleting override");
        let response = self.delete(&url).send().await.map_err(transport)?;
        self.handle_delete_response(&format!("delete override {override_id}"), response)
            .await
    }
}
