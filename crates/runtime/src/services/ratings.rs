use crate::error::{NexusError, NexusResult};
use crate::rating::{Rating, RatingSummary, MAX_SCORE, MIN_SCORE};
use crate::store::SharedStore;
use crate::target::Target;

#[derive(Clone)]
pub struct RatingAggregator {
    store: SharedStore,
}

impl RatingAggregator {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Creates the user's rating of `target`, or overwrites the score of an existing one.
    pub async fn rate(&self, target: Target, user_id: i64, score: i32) -> NexusResult<Rating> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(NexusError::invalid(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
            )));
        }

        match self.store.find_rating(target, user_id).await? {
            Some(existing) => self.store.update_rating_score(existing.id, score).await,
            None => self.store.insert_rating(target, user_id, score).await,
        }
    }

    pub async fn average(&self, target: Target) -> NexusResult<RatingSummary> {
        let stats = self.store.aggregate_rating_stats(target).await?;
        Ok(RatingSummary::from(stats))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::target::TargetType;

    fn aggregator() -> RatingAggregator {
        RatingAggregator::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn rerating_overwrites() {
        let ratings = aggregator();
        let post = Target::new(TargetType::Post, 1);

        let first = ratings.rate(post, 7, 5).await.unwrap();
        let second = ratings.rate(post, 7, 2).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.score, 2);

        let summary = ratings.average(post).await.unwrap();
        assert_eq!(summary.average, 2.0);
        assert_eq!(summary.count, 1);
    }

    #[tokio::test]
    async fn averages_across_users() {
        let ratings = aggregator();
        let project = Target::new(TargetType::Project, 3);
        ratings.rate(project, 1, 5).await.unwrap();
        ratings.rate(project, 2, 4).await.unwrap();
        ratings.rate(Target::new(TargetType::Post, 3), 2, 1).await.unwrap();

        let summary = ratings.average(project).await.unwrap();
        assert_eq!(summary.average, 4.5);
        assert_eq!(summary.count, 2);
    }

    #[tokio::test]
    async fn unrated_target_averages_zero() {
        let summary = aggregator().average(Target::new(TargetType::Post, 404)).await.unwrap();
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.count, 0);
    }

    #[tokio::test]
    async fn out_of_range_scores_are_rejected() {
        let ratings = aggregator();
        let post = Target::new(TargetType::Post, 1);
        assert!(matches!(ratings.rate(post, 1, 0).await, Err(NexusError::InvalidArgument(_))));
        assert!(matches!(ratings.rate(post, 1, 6).await, Err(NexusError::InvalidArgument(_))));
        assert_eq!(ratings.rate(post, 1, 3).await.unwrap().score, 3);
    }
}
