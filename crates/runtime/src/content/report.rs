use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum::{Display, EnumString};

use crate::target::TargetType;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

text_column!(ReportStatus);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub reporter_id: i64,

    #[sqlx(try_from = "String")]
    pub target_type: TargetType,
    pub target_id: i64,

    pub reason: String,

    #[sqlx(try_from = "String")]
    pub status: ReportStatus,
    pub moderator_id: Option<i64>,
    pub resolution: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}
