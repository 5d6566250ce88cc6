use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::target::{Target, TargetType};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

/// One score per `(target_type, target_id, user_id)`; re-rating overwrites `score`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,

    #[sqlx(try_from = "String")]
    pub target_type: TargetType,
    pub target_id: i64,
    pub user_id: i64,

    pub score: i32,
    pub created_at: i64,
}

impl Rating {
    pub fn target(&self) -> Target {
        Target::new(self.target_type, self.target_id)
    }
}

/// Raw aggregate as returned by storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct RatingStats {
    pub sum: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl From<RatingStats> for RatingSummary {
    fn from(stats: RatingStats) -> Self {
        let average = if stats.count == 0 {
            0.0
        } else {
            stats.sum as f64 / stats.count as f64
        };
        Self { average, count: stats.count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_average_to_zero() {
        let summary = RatingSummary::from(RatingStats::default());
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn mean_of_scores() {
        let summary = RatingSummary::from(RatingStats { sum: 7, count: 2 });
        assert_eq!(summary.average, 3.5);
    }
}
