use crate::error::NexusResult;
use crate::store::SharedStore;
use crate::target::Target;
use crate::user::Favorite;

#[derive(Clone)]
pub struct FavoriteToggler {
    store: SharedStore,
}

impl FavoriteToggler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Returns the existing favorite unchanged if there is one.
    pub async fn add(&self, target: Target, user_id: i64) -> NexusResult<Favorite> {
        if let Some(existing) = self.store.find_favorite(target, user_id).await? {
            return Ok(existing);
        }
        self.store.insert_favorite(target, user_id).await
    }

    /// Removing something that was never a favorite yields an empty list.
    pub async fn remove(&self, target: Target, user_id: i64) -> NexusResult<Vec<Favorite>> {
        self.store.delete_favorites(target, user_id).await
    }

    pub async fn list_for_user(&self, user_id: i64) -> NexusResult<Vec<Favorite>> {
        self.store.list_favorites_for_user(user_id).await
    }
}
