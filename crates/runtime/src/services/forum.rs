use crate::commands::{CreateCategory, CreateReply, CreateThread, ThreadFlagsRequest};
use crate::content::{ForumCategory, ForumReply, ForumThread};
use crate::error::{NexusError, NexusResult};
use crate::services::{AuthenticatedUser, ExperienceAwarder};
use crate::store::SharedStore;
use crate::user::ExperienceReward;

#[derive(Clone)]
pub struct Forum {
    store: SharedStore,
    experience: ExperienceAwarder,
}

impl Forum {
    pub fn new(store: SharedStore, experience: ExperienceAwarder) -> Self {
        Self { store, experience }
    }

    pub async fn categories(&self) -> NexusResult<Vec<ForumCategory>> {
        self.store.list_categories().await
    }

    pub async fn create_category(&self, actor: &AuthenticatedUser, category: &CreateCategory) -> NexusResult<ForumCategory> {
        actor.require_admin()?;
        self.store.create_category(category).await
    }

    async fn category(&self, id: i64) -> NexusResult<ForumCategory> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| NexusError::not_found(format!("forum category {id}")))
    }

    pub async fn threads(&self, category_id: i64) -> NexusResult<Vec<ForumThread>> {
        self.category(category_id).await?;
        self.store.list_threads(category_id).await
    }

    pub async fn thread(&self, id: i64) -> NexusResult<ForumThread> {
        self.store
            .get_thread(id)
            .await?
            .ok_or_else(|| NexusError::not_found(format!("thread {id}")))
    }

    pub async fn create_thread(&self, user_id: i64, thread: &CreateThread) -> NexusResult<ForumThread> {
        self.category(thread.category_id).await?;
        let thread = self.store.create_thread(user_id, thread).await?;
        self.experience.reward(user_id, ExperienceReward::ForumThread).await?;
        Ok(thread)
    }

    /// Unset flags keep their current value.
    pub async fn set_flags(&self, actor: &AuthenticatedUser, id: i64, flags: &ThreadFlagsRequest) -> NexusResult<ForumThread> {
        actor.require_moderator()?;
        let thread = self.thread(id).await?;
        let updated = self
            .store
            .update_thread_flags(
                id,
                flags.is_pinned.unwrap_or(thread.is_pinned),
                flags.is_locked.unwrap_or(thread.is_locked),
            )
            .await?;
        tracing::info!(thread_id = id, pinned = updated.is_pinned, locked = updated.is_locked, by = actor.id, "[Forum] thread flags changed");
        Ok(updated)
    }

    pub async fn replies(&self, thread_id: i64) -> NexusResult<Vec<ForumReply>> {
        self.thread(thread_id).await?;
        self.store.list_replies(thread_id).await
    }

    pub async fn reply(&self, thread_id: i64, user_id: i64, reply: &CreateReply) -> NexusResult<ForumReply> {
        let thread = self.thread(thread_id).await?;
        if thread.is_locked {
            return Err(NexusError::conflict(format!("thread {thread_id} is locked")));
        }
        let reply = self.store.create_reply(thread_id, user_id, reply).await?;
        self.experience.reward(user_id, ExperienceReward::ForumReply).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::NexusStore;
    use crate::user::UserRole;

    struct Fixture {
        store: Arc<MemoryStore>,
        forum: Forum,
        user: AuthenticatedUser,
        category_id: i64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("lurker", "x", UserRole::User).await.unwrap();
        let category = store
            .create_category(&CreateCategory {
                name: "Anime".into(),
                description: "Seasonal talk".into(),
                slug: "anime".into(),
                icon: None,
                order: 0,
            })
            .await
            .unwrap();
        let forum = Forum::new(store.clone(), ExperienceAwarder::new(store.clone()));
        Fixture { store, forum, user: AuthenticatedUser::from(&user), category_id: category.id }
    }

    fn thread(category_id: i64) -> CreateThread {
        CreateThread { category_id, title: "Best opening?".into(), content: "Discuss.".into() }
    }

    #[tokio::test]
    async fn threads_and_replies_award_experience() {
        let f = fixture().await;
        let thread = f.forum.create_thread(f.user.id, &thread(f.category_id)).await.unwrap();
        f.forum.reply(thread.id, f.user.id, &CreateReply { content: "This one.".into() }).await.unwrap();

        let user = f.store.get_user(f.user.id).await.unwrap().unwrap();
        assert_eq!(user.experience, 25);
        assert_eq!(f.forum.replies(thread.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn thread_in_missing_category_is_not_found() {
        let f = fixture().await;
        let err = f.forum.create_thread(f.user.id, &thread(999)).await.unwrap_err();
        assert!(matches!(err, NexusError::NotFound(_)));
        assert_eq!(f.store.get_user(f.user.id).await.unwrap().unwrap().experience, 0);
    }

    #[tokio::test]
    async fn locked_threads_refuse_replies() {
        let f = fixture().await;
        let thread = f.forum.create_thread(f.user.id, &thread(f.category_id)).await.unwrap();
        let moderator = AuthenticatedUser { id: f.user.id, role: UserRole::Moderator };
        let flags = ThreadFlagsRequest { is_pinned: None, is_locked: Some(true) };

        assert!(matches!(f.forum.set_flags(&f.user, thread.id, &flags).await, Err(NexusError::Forbidden(_))));
        let locked = f.forum.set_flags(&moderator, thread.id, &flags).await.unwrap();
        assert!(locked.is_locked);
        assert!(!locked.is_pinned);

        let err = f.forum.reply(thread.id, f.user.id, &CreateReply { content: "late".into() }).await.unwrap_err();
        assert!(matches!(err, NexusError::Conflict(_)));
    }
}
