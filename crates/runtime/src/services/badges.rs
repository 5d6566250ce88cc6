use crate::commands::CreateBadge;
use crate::error::{NexusError, NexusResult};
use crate::services::AuthenticatedUser;
use crate::store::SharedStore;
use crate::user::{Badge, EarnedBadge, UserBadge};

/// Grants catalog badges to users, at most once per pair.
#[derive(Clone)]
pub struct BadgeAwarder {
    store: SharedStore,
}

impl BadgeAwarder {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Idempotent: a second award returns the record from the first.
    pub async fn award(&self, user_id: i64, badge_id: i64) -> NexusResult<UserBadge> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(NexusError::not_found(format!("user {user_id}")));
        }
        if self.store.get_badge(badge_id).await?.is_none() {
            return Err(NexusError::not_found(format!("badge {badge_id}")));
        }

        if let Some(existing) = self.store.find_user_badge(user_id, badge_id).await? {
            return Ok(existing);
        }

        let user_badge = self.store.insert_user_badge(user_id, badge_id).await?;
        tracing::info!(user_id, badge_id, "[BadgeAwarder] badge earned");
        Ok(user_badge)
    }

    pub async fn list_for_user(&self, user_id: i64) -> NexusResult<Vec<EarnedBadge>> {
        self.store.list_user_badges(user_id).await
    }

    pub async fn catalog(&self) -> NexusResult<Vec<Badge>> {
        self.store.list_badges().await
    }

    pub async fn create(&self, actor: &AuthenticatedUser, badge: &CreateBadge) -> NexusResult<Badge> {
        actor.require_admin()?;
        self.store.create_badge(badge).await
    }
}
