use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::target::{Target, TargetType};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,

    #[sqlx(try_from = "String")]
    pub target_type: TargetType,
    pub target_id: i64,
    pub user_id: i64,

    pub created_at: i64,
}

impl Favorite {
    pub fn target(&self) -> Target {
        Target::new(self.target_type, self.target_id)
    }
}
