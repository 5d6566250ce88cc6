use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const OWNER_ROLE: &str = "owner";
pub const MEMBER_ROLE: &str = "member";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub repository: Option<String>,
    pub website_url: Option<String>,
    pub user_id: i64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// At most one membership per `(project_id, user_id)`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role: String,
    pub joined_at: i64,
}
