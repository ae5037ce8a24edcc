//! Group provisioning plans.
//!
//! This is part of the Functional Core - all functions are pure with no side effects.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use crate::course::Group;
use crate::overrides::{MappedStudentRow, SkipReason};

/// Two-level lookup: scope -> group name -> group id.
///
/// The scope is a group set id when assigning members, or a practical name when
/// scheduling overrides. Misses are `None`, never a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndex<K: Eq + Hash> {
    scopes: HashMap<K, HashMap<String, u64>>,
}

impl<K: Eq + Hash> Default for GroupIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> GroupIndex<K> {
    pub fn new() -> Self {
        Self {
            scopes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, scope: K, name: impl Into<String>, group_id: u64) {
        self.scopes
            .entry(scope)
            .or_default()
            .insert(name.into(), group_id);
    }

    pub fn lookup(&self, scope: &K, name: &str) -> Option<u64> {
        self.scopes.get(scope)?.get(name).copied()
    }
}

impl GroupIndex<u64> {
    /// Indexes groups by their group set id.
    pub fn from_groups(groups: &[Group]) -> Self {
        let mut index = Self::new();
        for group in groups {
            index.insert(group.group_set_id, group.name.clone(), group.id);
        }
        index
    }
}

/// Partition of requested names against the names already present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamePartition {
    pub missing: Vec<String>,
    pub existing: Vec<String>,
}

/// Splits `requested` into names to create and names that already exist.
///
/// Matching is exact. Order is preserved and repeated requests are collapsed,
/// so a name is never created twice in one call.
pub fn partition_names<'a>(
    requested: impl IntoIterator<Item = &'a str>,
    existing: impl IntoIterator<Item = &'a str>,
) -> NamePartition {
    let existing: HashSet<&str> = existing.into_iter().collect();
    let mut seen = HashSet::new();
    let mut partition = NamePartition::default();
    for name in requested {
        if !seen.insert(name) {
            continue;
        }
        if existing.contains(name) {
            partition.existing.push(name.to_string());
        } else {
            partition.missing.push(name.to_string());
        }
    }
    partition
}

/// One membership to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipPlan {
    pub student_name: String,
    pub user_id: u64,
    pub group_set: String,
    pub group_name: String,
    pub group_id: u64,
}

/// An item of a membership plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MembershipPlanItem {
    Assign(MembershipPlan),
    Skip { student: String, reason: SkipReason },
}

/// Plans group memberships from a wide sheet with one column per group set.
///
/// `group_set_ids` names the columns to read (column label -> group set id);
/// other columns are ignored, as are blank cells.
pub fn plan_memberships(
    rows: &[MappedStudentRow],
    group_set_ids: &HashMap<String, u64>,
    index: &GroupIndex<u64>,
) -> Vec<MembershipPlanItem> {
    let mut plan = Vec::new();
    for mapped in rows {
        let student = &mapped.row.name;
        for (column, group_name) in &mapped.row.cells {
            let Some(set_id) = group_set_ids.get(column) else {
                continue;
            };
            let group_name = group_name.trim();
            if group_name.is_empty() {
                continue;
            }
            let Some(user_id) = mapped.user.id() else {
                plan.push(MembershipPlanItem::Skip {
                    student: student.clone(),
                    reason: SkipReason::UnresolvedStudent {
                        external_id: mapped.row.external_id.clone(),
                        name: student.clone(),
                    },
                });
                continue;
            };
            let Some(group_id) = index.lookup(set_id, group_name) else {
                plan.push(MembershipPlanItem::Skip {
                    student: student.clone(),
                    reason: SkipReason::UnknownGroup {
                        scope: column.clone(),
                        group: group_name.to_string(),
                    },
                });
                continue;
            };
            plan.push(MembershipPlanItem::Assign(MembershipPlan {
                student_name: student.clone(),
                user_id,
                group_set: column.clone(),
                group_name: group_name.to_string(),
                group_id,
            }));
        }
    }
    plan
}
