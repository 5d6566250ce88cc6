use crate::commands::CreateTemplate;
use crate::content::ContentTemplate;
use crate::error::NexusResult;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct Templates {
    store: SharedStore,
}

impl Templates {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: i64, template: &CreateTemplate) -> NexusResult<ContentTemplate> {
        self.store.create_template(user_id, template).await
    }

    pub async fn list(&self, category: Option<&str>) -> NexusResult<Vec<ContentTemplate>> {
        let category = category.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty());
        self.store.list_templates(category.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn filters_by_category() {
        let templates = Templates::new(Arc::new(MemoryStore::new()));
        for category in ["anime_review", "tutorial", "anime_review"] {
            templates
                .create(
                    1,
                    &CreateTemplate {
                        name: "Template".into(),
                        description: "desc".into(),
                        category: category.into(),
                        content: "## Verdict".into(),
                    },
                )
                .await
                .unwrap();
        }
        assert_eq!(templates.list(Some(" Anime_Review ")).await.unwrap().len(), 2);
        assert_eq!(templates.list(Some("")).await.unwrap().len(), 3);
        assert_eq!(templates.list(None).await.unwrap().len(), 3);
    }
}
