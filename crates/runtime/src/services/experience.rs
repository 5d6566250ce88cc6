use crate::error::{NexusError, NexusResult};
use crate::store::SharedStore;
use crate::user::{ExperienceReward, Progression, User};

/// Adds experience to users and keeps their stored level in sync.
#[derive(Clone)]
pub struct ExperienceAwarder {
    store: SharedStore,
}

impl ExperienceAwarder {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Level is recomputed from the new cumulative total, never adjusted incrementally.
    pub async fn award(&self, user_id: i64, amount: i64) -> NexusResult<User> {
        if amount < 0 {
            return Err(NexusError::invalid("experience amount must not be negative"));
        }

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| NexusError::not_found(format!("user {user_id}")))?;

        let progression = Progression::apply(user.experience, amount);
        let updated = self
            .store
            .update_user_experience_and_level(user.id, progression.experience, progression.level)
            .await?;

        if updated.level > user.level {
            tracing::info!(user_id, from = user.level, to = updated.level, "[ExperienceAwarder] level up");
        }
        tracing::debug!(user_id, amount, experience = updated.experience, "[ExperienceAwarder] awarded");
        Ok(updated)
    }

    pub async fn reward(&self, user_id: i64, reward: ExperienceReward) -> NexusResult<User> {
        self.award(user_id, reward.amount()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::NexusStore;
    use crate::user::UserRole;

    #[tokio::test]
    async fn awarding_twice_accumulates() {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("ember", "x", UserRole::User).await.unwrap();
        let awarder = ExperienceAwarder::new(store.clone());

        awarder.award(user.id, 10).await.unwrap();
        let after = awarder.award(user.id, 10).await.unwrap();
        assert_eq!(after.experience, user.experience + 20);
        assert_eq!(after.level, 1);

        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.experience, 20);
    }

    #[tokio::test]
    async fn level_is_recomputed_from_total() {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("ember", "x", UserRole::User).await.unwrap();
        let awarder = ExperienceAwarder::new(store.clone());

        let after = awarder.award(user.id, 95).await.unwrap();
        assert_eq!(after.level, 1);
        let after = awarder.reward(user.id, ExperienceReward::Post).await.unwrap();
        assert_eq!(after.experience, 105);
        assert_eq!(after.level, 2);
        let after = awarder.award(user.id, 300).await.unwrap();
        assert_eq!(after.level, 3);
    }

    #[tokio::test]
    async fn unknown_user_and_negative_amount_fail() {
        let store = Arc::new(MemoryStore::new());
        let awarder = ExperienceAwarder::new(store.clone());
        assert!(matches!(awarder.award(404, 10).await, Err(NexusError::NotFound(_))));

        let user = store.create_user("ember", "x", UserRole::User).await.unwrap();
        assert!(matches!(awarder.award(user.id, -1).await, Err(NexusError::InvalidArgument(_))));
    }
}
