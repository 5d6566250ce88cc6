use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry. Immutable once created.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
}

/// At most one row per `(user_id, badge_id)`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub id: i64,
    pub user_id: i64,
    pub badge_id: i64,
    pub earned_at: i64,
}

/// A badge joined with the time a particular user earned it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub badge: Badge,
    pub earned_at: i64,
}
