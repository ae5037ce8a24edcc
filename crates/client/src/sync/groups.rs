//! Group set and group provisioning, and group membership assignment.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use coursesync_core::course::{Group, GroupSet, StudentRow};
use coursesync_core::groups::{partition_names, plan_memberships, GroupIndex, MembershipPlanItem};
use coursesync_core::overrides::{remap_student_table, IdentifierMapping, SkipReason};
use coursesync_core::platform::{EnrollmentApi, GroupApi};

use super::roster::RosterReconciler;
use super::ItemFailure;
use crate::error::Result;

/// Outcome of provisioning one group set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GroupSetOutcome {
    Created(GroupSet),
    AlreadyExists(GroupSet),
    Failed { name: String, error: String },
}

/// Groups provisioned in one group set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// Only the groups this call created.
    pub created: Vec<Group>,
    /// Requested names that were already present.
    pub existing: Vec<String>,
    pub failed: Vec<ItemFailure>,
}

/// Outcome of deleting one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GroupDeletion {
    Deleted {
        group_id: u64,
        name: String,
    },
    Failed {
        name: String,
        group_id: Option<u64>,
        error: String,
    },
}

/// Outcome of one membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MembershipOutcome {
    Added {
        student: String,
        group_set: String,
        group_name: String,
        membership_id: u64,
    },
    Skipped {
        student: String,
        reason: SkipReason,
    },
    Failed {
        student: String,
        group_name: String,
        error: String,
    },
}

/// Creates group sets and groups, and places students in them.
///
/// Creating a group set or group whose name already exists is a skip, never a
/// duplicate and never an error.
pub struct GroupProvisioner<'a, P: ?Sized> {
    platform: &'a P,
}

impl<'a, P: GroupApi + EnrollmentApi + ?Sized> GroupProvisioner<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    pub async fn list_group_sets(&self) -> Result<Vec<GroupSet>> {
        Ok(self.platform.list_group_sets().await?)
    }

    pub async fn list_groups(&self, group_set_id: u64) -> Result<Vec<Group>> {
        Ok(self.platform.list_groups(group_set_id).await?)
    }

    /// Creates a group set unless one with the same name exists.
    pub async fn create_group_set(&self, name: &str) -> Result<GroupSetOutcome> {
        let existing = self.platform.list_group_sets().await?;
        if let Some(set) = existing.into_iter().find(|s| s.name == name) {
            tracing::warn!(name, group_set_id = set.id, "Group set already exists");
            return Ok(GroupSetOutcome::AlreadyExists(set));
        }
        let created = self.platform.create_group_set(name).await?;
        tracing::info!(name, group_set_id = created.id, "Created group set");
        Ok(GroupSetOutcome::Created(created))
    }

    /// Creates each group set in turn. A failure is recorded and the batch goes on.
    pub async fn create_group_sets(&self, names: &[String]) -> Vec<GroupSetOutcome> {
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            let outcome = match self.create_group_set(name).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(%name, error = %e, "Failed to create group set");
                    GroupSetOutcome::Failed {
                        name: name.clone(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Creates the requested groups missing from a group set.
    pub async fn ensure_groups(&self, group_set_id: u64, names: &[String]) -> Result<ProvisionReport> {
        let existing = self.platform.list_groups(group_set_id).await?;
        let partition = partition_names(
            names.iter().map(String::as_str),
            existing.iter().map(|g| g.name.as_str()),
        );

        let mut report = ProvisionReport {
            existing: partition.existing,
            ..ProvisionReport::default()
        };
        for name in &report.existing {
            tracing::warn!(group_set_id, %name, "Group already exists");
        }
        for name in partition.missing {
            match self.platform.create_group(group_set_id, &name).await {
                Ok(group) => {
                    tracing::info!(group_set_id, %name, group_id = group.id, "Created group");
                    report.created.push(group);
                }
                Err(e) => {
                    tracing::error!(group_set_id, %name, error = %e, "Failed to create group");
                    report.failed.push(ItemFailure::new(name, e));
                }
            }
        }
        Ok(report)
    }

    /// Runs [`Self::ensure_groups`] for every set independently.
    pub async fn ensure_groups_across_sets(
        &self,
        group_set_ids: &[u64],
        names: &[String],
    ) -> BTreeMap<u64, ProvisionReport> {
        let mut reports = BTreeMap::new();
        for &group_set_id in group_set_ids {
            let report = match self.ensure_groups(group_set_id, names).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(group_set_id, error = %e, "Failed to list groups");
                    ProvisionReport {
                        failed: vec![ItemFailure::new(format!("group set {group_set_id}"), e)],
                        ..ProvisionReport::default()
                    }
                }
            };
            reports.insert(group_set_id, report);
        }
        reports
    }

    /// Deletes every group in a set.
    ///
    /// Ids are looked up again by name before each deletion, so a group renamed
    /// or removed since the first listing is reported rather than deleted.
    pub async fn delete_all_groups_in_set(&self, group_set_id: u64) -> Result<Vec<GroupDeletion>> {
        let groups = self.platform.list_groups(group_set_id).await?;
        let mut names: Vec<String> = Vec::new();
        for group in groups {
            if !names.contains(&group.name) {
                names.push(group.name);
            }
        }

        let mut outcomes = Vec::new();
        for name in names {
            let current = match self.platform.list_groups(group_set_id).await {
                Ok(current) => current,
                Err(e) => {
                    tracing::error!(group_set_id, %name, error = %e, "Failed to resolve group");
                    outcomes.push(GroupDeletion::Failed {
                        name,
                        group_id: None,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            for group in current.into_iter().filter(|g| g.name == name) {
                let outcome = match self.platform.delete_group(group.id).await {
                    Ok(()) => {
                        tracing::info!(group_set_id, name = %group.name, group_id = group.id, "Deleted group");
                        GroupDeletion::Deleted {
                            group_id: group.id,
                            name: group.name,
                        }
                    }
                    Err(e) => {
                        tracing::error!(group_set_id, name = %group.name, error = %e, "Failed to delete group");
                        GroupDeletion::Failed {
                            name: group.name,
                            group_id: Some(group.id),
                            error: e.to_string(),
                        }
                    }
                };
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Indexes the groups of the given sets by set id and group name.
    pub async fn group_index(&self, group_set_ids: &[u64]) -> Result<GroupIndex<u64>> {
        let mut groups = Vec::new();
        for &group_set_id in group_set_ids {
            groups.extend(self.platform.list_groups(group_set_id).await?);
        }
        Ok(GroupIndex::from_groups(&groups))
    }

    /// Adds students to the groups named in a wide sheet.
    ///
    /// `group_set_ids` maps each group-set column of the sheet to its set id.
    pub async fn assign_students_to_groups(
        &self,
        rows: &[StudentRow],
        group_set_ids: &HashMap<String, u64>,
        index: &GroupIndex<u64>,
    ) -> Result<Vec<MembershipOutcome>> {
        let roster = RosterReconciler::new(self.platform).fetch_roster().await?;
        let mapped = remap_student_table(rows, &IdentifierMapping::from_roster(&roster));

        let mut outcomes = Vec::new();
        for item in plan_memberships(&mapped, group_set_ids, index) {
            let outcome = match item {
                MembershipPlanItem::Skip { student, reason } => {
                    tracing::warn!(%student, %reason, "Skipped");
                    MembershipOutcome::Skipped { student, reason }
                }
                MembershipPlanItem::Assign(plan) => {
                    match self.platform.add_membership(plan.group_id, plan.user_id).await {
                        Ok(membership) => {
                            tracing::info!(student = %plan.student_name, group = %plan.group_name, "Added to group");
                            MembershipOutcome::Added {
                                student: plan.student_name,
                                group_set: plan.group_set,
                                group_name: plan.group_name,
                                membership_id: membership.id,
                            }
                        }
                        Err(e) => {
                            tracing::error!(student = %plan.student_name, group = %plan.group_name, error = %e, "Failed to add to group");
                            MembershipOutcome::Failed {
                                student: plan.student_name,
                                group_name: plan.group_name,
                                error: e.to_string(),
                            }
                        }
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::{FailurePoint, InMemoryPlatform};
    use coursesync_core::course::EnrollmentRecord;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_ensure_groups_is_idempotent() {
        let platform = InMemoryPlatform::new(7);
        let set = platform.seed_group_set("Labs").await;
        let provisioner = GroupProvisioner::new(&platform);

        let first = provisioner.ensure_groups(set, &names(&["A", "B"])).await.unwrap();
        let second = provisioner.ensure_groups(set, &names(&["A", "B"])).await.unwrap();

        assert_eq!(first.created.len(), 2);
        assert!(first.existing.is_empty());
        assert!(second.created.is_empty());
        assert_eq!(second.existing, names(&["A", "B"]));
        assert_eq!(platform.groups_of(set).await.len(), 2);
    }

    #[tokio::test]
    async fn test_ensure_groups_returns_only_new_groups() {
        let platform = InMemoryPlatform::new(7);
        let set = platform.seed_group_set("Labs").await;
        platform.seed_group(set, "A").await;
        platform.fail_on(FailurePoint::CreateGroup("C".to_string())).await;
        let provisioner = GroupProvisioner::new(&platform);

        let report = provisioner
            .ensure_groups(set, &names(&["A", "B", "C"]))
            .await
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].name, "B");
        assert_eq!(report.existing, names(&["A"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].item, "C");
    }

    #[tokio::test]
    async fn test_ensure_groups_across_sets_is_independent() {
        let platform = InMemoryPlatform::new(7);
        let labs = platform.seed_group_set("Labs").await;
        let broken = platform.seed_group_set("Tutorials").await;
        platform.fail_on(FailurePoint::ListGroups(broken)).await;
        let provisioner = GroupProvisioner::new(&platform);

        let reports = provisioner
            .ensure_groups_across_sets(&[broken, labs], &names(&["A"]))
            .await;

        assert_eq!(reports[&broken].failed.len(), 1);
        assert_eq!(reports[&labs].created.len(), 1);
    }

    #[tokio::test]
    async fn test_create_group_sets_skips_existing_and_continues() {
        let platform = InMemoryPlatform::new(7);
        platform.seed_group_set("Labs").await;
        platform
            .fail_on(FailurePoint::CreateGroupSet("Broken".to_string()))
            .await;
        let provisioner = GroupProvisioner::new(&platform);

        let outcomes = provisioner
            .create_group_sets(&names(&["Labs", "Broken", "Tutorials"]))
            .await;

        assert!(matches!(outcomes[0], GroupSetOutcome::AlreadyExists(_)));
        assert!(matches!(outcomes[1], GroupSetOutcome::Failed { .. }));
        assert!(matches!(&outcomes[2], GroupSetOutcome::Created(set) if set.name == "Tutorials"));
        assert_eq!(platform.group_sets().await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_all_groups_relists_per_name() {
        let platform = InMemoryPlatform::new(7);
        let set = platform.seed_group_set("Labs").await;
        platform.seed_group(set, "A").await;
        let stuck = platform.seed_group(set, "B").await;
        platform.seed_group(set, "C").await;
        platform.fail_on(FailurePoint::DeleteGroup(stuck)).await;
        let provisioner = GroupProvisioner::new(&platform);

        let outcomes = provisioner.delete_all_groups_in_set(set).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[1], GroupDeletion::Failed { group_id: Some(id), .. } if id == stuck));
        let remaining = platform.groups_of(set).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, stuck);
        let lists = platform
            .calls()
            .await
            .iter()
            .filter(|c| c.starts_with("list_groups"))
            .count();
        assert_eq!(lists, 4);
    }

    #[tokio::test]
    async fn test_assign_students_isolates_unresolved_group() {
        let platform = InMemoryPlatform::new(7);
        let set = platform.seed_group_set("Labs").await;
        let lab_a = platform.seed_group(set, "Lab A").await;
        platform.seed_group(set, "Lab B").await;
        for (user, sis, name) in [(11, "100", "Ada"), (12, "200", "Bob"), (13, "300", "Cy"), (14, "400", "Di"), (15, "500", "Ed")] {
            platform
                .seed_enrollment(EnrollmentRecord::new(user, sis, name))
                .await;
        }
        platform
            .fail_on(FailurePoint::AddMembership {
                group_id: lab_a,
                user_id: 12,
            })
            .await;
        let rows = vec![
            StudentRow::new("100", "Ada").with_cell("Labs", "Lab A"),
            StudentRow::new("200", "Bob").with_cell("Labs", "Lab A"),
            StudentRow::new("300", "Cy").with_cell("Labs", "Lab Z"),
            StudentRow::new("400", "Di").with_cell("Labs", "Lab B"),
            StudentRow::new("500", "Ed").with_cell("Labs", "Lab B"),
        ];
        let set_ids = HashMap::from([("Labs".to_string(), set)]);
        let provisioner = GroupProvisioner::new(&platform);
        let index = provisioner.group_index(&[set]).await.unwrap();

        let outcomes = provisioner
            .assign_students_to_groups(&rows, &set_ids, &index)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 5);
        assert!(matches!(
            &outcomes[2],
            MembershipOutcome::Skipped { reason: SkipReason::UnknownGroup { .. }, .. }
        ));
        assert!(matches!(outcomes[1], MembershipOutcome::Failed { .. }));
        let issued = platform
            .calls()
            .await
            .iter()
            .filter(|c| c.starts_with("add_membership"))
            .count();
        assert_eq!(issued, 4);
        assert_eq!(platform.memberships().await.len(), 3);
    }
}
