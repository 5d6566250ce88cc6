use crate::commands::{CreateProject, JoinProjectRequest};
use crate::content::{Project, ProjectMember, MEMBER_ROLE};
use crate::error::{NexusError, NexusResult};
use crate::services::ExperienceAwarder;
use crate::store::SharedStore;
use crate::user::ExperienceReward;

const JOINABLE_ROLES: &[&str] = &[MEMBER_ROLE, "contributor", "designer", "developer", "writer"];

#[derive(Clone)]
pub struct Projects {
    store: SharedStore,
    experience: ExperienceAwarder,
}

impl Projects {
    pub fn new(store: SharedStore, experience: ExperienceAwarder) -> Self {
        Self { store, experience }
    }

    /// The creator becomes the project's owner. The experience reward follows the insert, so a
    /// failed award leaves the project and its owner in place.
    pub async fn create(&self, user_id: i64, project: &CreateProject) -> NexusResult<Project> {
        let project = self.store.create_project(user_id, project).await?;
        self.experience.reward(user_id, ExperienceReward::Project).await?;
        tracing::info!(project_id = project.id, user_id, "[Projects] created {}", project.name);
        Ok(project)
    }

    pub async fn list(&self) -> NexusResult<Vec<Project>> {
        self.store.list_projects().await
    }

    pub async fn list_for_user(&self, user_id: i64) -> NexusResult<Vec<Project>> {
        self.store.list_projects_for_user(user_id).await
    }

    pub async fn get(&self, id: i64) -> NexusResult<Project> {
        self.store
            .get_project(id)
            .await?
            .ok_or_else(|| NexusError::not_found(format!("project {id}")))
    }

    pub async fn members(&self, project_id: i64) -> NexusResult<Vec<ProjectMember>> {
        self.get(project_id).await?;
        self.store.list_project_members(project_id).await
    }

    pub async fn join(&self, project_id: i64, user_id: i64, request: &JoinProjectRequest) -> NexusResult<ProjectMember> {
        self.get(project_id).await?;
        let role = request
            .role
            .as_deref()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| MEMBER_ROLE.to_string());
        if !JOINABLE_ROLES.contains(&role.as_str()) {
            return Err(NexusError::invalid(format!("cannot join a project as `{role}`")));
        }
        self.store.add_project_member(project_id, user_id, &role).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::content::OWNER_ROLE;
    use crate::memory::MemoryStore;
    use crate::store::NexusStore;
    use crate::user::UserRole;

    #[tokio::test]
    async fn create_makes_owner_and_awards_fifty() {
        let store = Arc::new(MemoryStore::new());
        let owner = store.create_user("architect", "x", UserRole::User).await.unwrap();
        let joiner = store.create_user("builder", "x", UserRole::User).await.unwrap();
        let projects = Projects::new(store.clone(), ExperienceAwarder::new(store.clone()));

        let project = projects
            .create(
                owner.id,
                &CreateProject {
                    name: "Shadow Wiki".into(),
                    description: "Lore database".into(),
                    repository: None,
                    website_url: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(project.status, "active");
        assert_eq!(store.get_user(owner.id).await.unwrap().unwrap().experience, 50);

        let member = projects.join(project.id, joiner.id, &JoinProjectRequest::default()).await.unwrap();
        assert_eq!(member.role, MEMBER_ROLE);

        let again = projects.join(project.id, joiner.id, &JoinProjectRequest::default()).await;
        assert!(matches!(again, Err(NexusError::Conflict(_))));

        let hijack = JoinProjectRequest { role: Some("Owner".into()) };
        let third = store.create_user("intruder", "x", UserRole::User).await.unwrap();
        assert!(matches!(projects.join(project.id, third.id, &hijack).await, Err(NexusError::InvalidArgument(_))));

        let members = projects.members(project.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].role, OWNER_ROLE);
        assert_eq!(projects.list_for_user(owner.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn joining_missing_project_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let projects = Projects::new(store.clone(), ExperienceAwarder::new(store));
        let err = projects.join(12, 1, &JoinProjectRequest::default()).await.unwrap_err();
        assert!(matches!(err, NexusError::NotFound(_)));
    }
}
