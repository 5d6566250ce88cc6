use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reusable content skeleton (anime review, tutorial, project pitch, ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentTemplate {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub content: String,
    pub created_by: i64,
    pub created_at: i64,
}
