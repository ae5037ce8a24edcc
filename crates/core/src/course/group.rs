use serde::{Deserialize, Serialize};

/// A group set (the platform calls it a group category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSet {
    pub id: u64,
    pub name: String,
}

/// A group inside a group set. Names are unique within their set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    #[serde(rename = "group_category_id")]
    pub group_set_id: u64,
    pub name: String,
}

/// A student's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: u64,
    pub group_id: u64,
    pub user_id: u64,
}
