use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ForumCategory {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub icon: Option<String>,
    pub order: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ForumThread {
    pub id: i64,
    pub category_id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ForumReply {
    pub id: i64,
    pub thread_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}
