use crate::commands::CreatePost;
use crate::content::Post;
use crate::error::{NexusError, NexusResult};
use crate::services::ExperienceAwarder;
use crate::store::SharedStore;
use crate::user::ExperienceReward;

/// The microblog feed.
#[derive(Clone)]
pub struct Feed {
    store: SharedStore,
    experience: ExperienceAwarder,
}

impl Feed {
    pub fn new(store: SharedStore, experience: ExperienceAwarder) -> Self {
        Self { store, experience }
    }

    pub async fn create(&self, user_id: i64, post: &CreatePost) -> NexusResult<Post> {
        let post = self.store.create_post(user_id, post).await?;
        self.experience.reward(user_id, ExperienceReward::Post).await?;
        Ok(post)
    }

    pub async fn list(&self) -> NexusResult<Vec<Post>> {
        self.store.list_posts().await
    }

    pub async fn get(&self, id: i64) -> NexusResult<Post> {
        self.store
            .get_post(id)
            .await?
            .ok_or_else(|| NexusError::not_found(format!("post {id}")))
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
    async fn posting_rewards_the_author() {
        let store = Arc::new(MemoryStore::new());
        let author = store.create_user("scribe", "x", UserRole::User).await.unwrap();
        let feed = Feed::new(store.clone(), ExperienceAwarder::new(store.clone()));

        let post = CreatePost { content: "Arc two was better".into(), image: None, tags: vec!["anime".into()] };
        let created = feed.create(author.id, &post).await.unwrap();
        assert_eq!(feed.get(created.id).await.unwrap(), created);
        assert_eq!(store.get_user(author.id).await.unwrap().unwrap().experience, 10);

        assert!(matches!(feed.get(created.id + 1).await, Err(NexusError::NotFound(_))));
    }
}
