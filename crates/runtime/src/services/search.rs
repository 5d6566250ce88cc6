use serde::Serialize;
use strum::{Display, EnumString};

use crate::content::{ContentTemplate, ForumThread, Post, Project};
use crate::error::{NexusError, NexusResult};
use crate::store::SharedStore;
use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SearchKind {
    Posts,
    Threads,
    Projects,
    Templates,
    Users,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Posts(Vec<Post>),
    Threads(Vec<ForumThread>),
    Projects(Vec<Project>),
    Templates(Vec<ContentTemplate>),
    Users(Vec<User>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Posts(v) => v.len(),
            Self::Threads(v) => v.len(),
            Self::Projects(v) => v.len(),
            Self::Templates(v) => v.len(),
            Self::Users(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone)]
pub struct Search {
    store: SharedStore,
}

impl Search {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn run(&self, kind: SearchKind, query: &str) -> NexusResult<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NexusError::invalid("search query must not be empty"));
        }

        let results = match kind {
            SearchKind::Posts => SearchResults::Posts(self.store.search_posts(query).await?),
            SearchKind::Threads => SearchResults::Threads(self.store.search_threads(query).await?),
            SearchKind::Projects => SearchResults::Projects(self.store.search_projects(query).await?),
            SearchKind::Templates => SearchResults::Templates(self.store.search_templates(query).await?),
            SearchKind::Users => SearchResults::Users(self.store.search_users(query).await?),
        };
        tracing::debug!(%kind, query, hits = results.len(), "[Search] done");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::commands::CreatePost;
    use crate::memory::MemoryStore;
    use crate::store::NexusStore;
    use crate::user::UserRole;

    #[tokio::test]
    async fn matches_case_insensitively() {
        let store = Arc::new(MemoryStore::new());
        store.create_user("ShadowCat", "x", UserRole::User).await.unwrap();
        store
            .create_post(1, &CreatePost { content: "Eternal SHADOW arc finale".into(), image: None, tags: vec![] })
            .await
            .unwrap();
        let search = Search::new(store);

        let posts = search.run(SearchKind::Posts, "shadow").await.unwrap();
        assert!(matches!(&posts, SearchResults::Posts(p) if p.len() == 1));
        assert_eq!(search.run(SearchKind::Users, "cat").await.unwrap().len(), 1);
        assert!(search.run(SearchKind::Projects, "shadow").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let search = Search::new(Arc::new(MemoryStore::new()));
        assert!(matches!(search.run(SearchKind::Posts, "   ").await, Err(NexusError::InvalidArgument(_))));
        assert!("forums".parse::<SearchKind>().is_err());
        assert_eq!("threads".parse::<SearchKind>().unwrap(), SearchKind::Threads);
    }
}
