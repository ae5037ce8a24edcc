//! Group set, group and membership API operations.

use async_trait::async_trait;
use coursesync_core::course::{Group, GroupMembership, GroupSet};
use coursesync_core::platform::{GroupApi, Result};
use serde_json::json;

use super::{transport, CanvasClient};

#[async_trait]
impl GroupApi for CanvasClient {
    async fn list_group_sets(&self) -> Result<Vec<GroupSet>> {
        self.get_paged("group sets", &self.course_url("/group_categories"), &[])
            .await
    }

    async fn create_group_set(&self, name: &str) -> Result<GroupSet> {
        let response = self
            .post(&self.course_url("/group_categories"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(transport)?;
        self.handle_mutation(&format!("create group set '{name}'"), response)
            .await
    }

    async fn list_groups(&self, group_set_id: u64) -> Result<Vec<Group>> {
        self.get_paged(
            &format!("groups of set {group_set_id}"),
            &self.url(&format!("/group_categories/{group_set_id}/groups")),
            &[],
        )
        .await
    }

    async fn create_group(&self, group_set_id: u64, name: &str) -> Result<Group> {
        let response = self
            .post(&self.url(&format!("/group_categories/{group_set_id}/groups")))
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(transport)?;
        self.handle_mutation(&format!("create group '{name}'"), response)
            .await
    }

    async fn delete_group(&self, group_id: u64) -> Result<()> {
        let response = self
            .delete(&self.url(&format!("/groups/{group_id}")))
            .send()
            .await
            .map_err(transport)?;
        self.handle_delete_response(&format!("delete group {group_id}"), response)
            .await
    }

    async fn add_membership(&self, group_id: u64, user_id: u64) -> Result<GroupMembership> {
        let response = self
            .post(&self.url(&format!("/groups/{group_id}/memberships")))
            .json(&json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(transport)?;
        self.handle_mutation(
            &format!("add user {user_id} to group {group_id}"),
            response,
        )
        .await
    }
}
