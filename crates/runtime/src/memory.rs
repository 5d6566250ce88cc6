use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use nexus_common::get_current_timestamp;

use crate::commands::{
    CreateBadge, CreateCategory, CreatePost, CreateProject, CreateReply, CreateReport,
    CreateTemplate, CreateThread, ReviewReport,
};
use crate::content::{
    ContentTemplate, ForumCategory, ForumReply, ForumThread, Post, Project, ProjectMember, Report,
    ReportStatus, OWNER_ROLE,
};
use crate::error::{NexusError, NexusResult};
use crate::rating::{Rating, RatingStats};
use crate::store::NexusStore;
use crate::target::Target;
use crate::user::{Badge, EarnedBadge, Favorite, User, UserBadge, UserRole};

#[derive(Default)]
struct Tables {
    next_id: i64,

    users: BTreeMap<i64, User>,
    badges: BTreeMap<i64, Badge>,
    user_badges: BTreeMap<i64, UserBadge>,
    ratings: BTreeMap<i64, Rating>,
    favorites: BTreeMap<i64, Favorite>,
    posts: BTreeMap<i64, Post>,
    categories: BTreeMap<i64, ForumCategory>,
    threads: BTreeMap<i64, ForumThread>,
    replies: BTreeMap<i64, ForumReply>,
    projects: BTreeMap<i64, Project>,
    project_members: BTreeMap<i64, ProjectMember>,
    templates: BTreeMap<i64, ContentTemplate>,
    reports: BTreeMap<i64, Report>,
}

impl Tables {
    /// Ids are unique across all tables, which keeps them monotonic per table as well.
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Process-local store. One lock guards every table, so each trait call is atomic.
/// Data is lost on restart; used for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NexusStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str, role: UserRole) -> NexusResult<User> {
        let mut tables = self.tables.write().await;
        let lowered = username.to_lowercase();
        if tables.users.values().any(|u| u.username.to_lowercase() == lowered) {
            return Err(NexusError::conflict(format!("username `{username}` is taken")));
        }
        let user = User {
            id: tables.allocate_id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            avatar: None,
            bio: None,
            role,
            level: 1,
            experience: 0,
            created_at: get_current_timestamp(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> NexusResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> NexusResult<Option<User>> {
        let lowered = username.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username.to_lowercase() == lowered)
            .cloned())
    }

    async fn update_user_experience_and_level(&self, id: i64, experience: i64, level: i64) -> NexusResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| NexusError::not_found(format!("user {id}")))?;
        user.experience = experience;
        user.level = level;
        Ok(user.clone())
    }

    async fn update_user_role(&self, id: i64, role: UserRole) -> NexusResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| NexusError::not_found(format!("user {id}")))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn search_users(&self, query: &str) -> NexusResult<Vec<User>> {
        let needle = query.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .filter(|u| {
                contains_ignore_case(&u.username, &needle)
                    || u.bio.as_deref().is_some_and(|bio| contains_ignore_case(bio, &needle))
            })
            .cloned()
            .collect())
    }

    async fn create_badge(&self, badge: &CreateBadge) -> NexusResult<Badge> {
        let mut tables = self.tables.write().await;
        let badge = Badge {
            id: tables.allocate_id(),
            name: badge.name.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
        };
        tables.badges.insert(badge.id, badge.clone());
        Ok(badge)
    }

    async fn get_badge(&self, id: i64) -> NexusResult<Option<Badge>> {
        Ok(self.tables.read().await.badges.get(&id).cloned())
    }

    async fn list_badges(&self) -> NexusResult<Vec<Badge>> {
        Ok(self.tables.read().await.badges.values().cloned().collect())
    }

    async fn find_user_badge(&self, user_id: i64, badge_id: i64) -> NexusResult<Option<UserBadge>> {
        Ok(self
            .tables
            .read()
            .await
            .user_badges
            .values()
            .find(|ub| ub.user_id == user_id && ub.badge_id == badge_id)
            .cloned())
    }

    async fn insert_user_badge(&self, user_id: i64, badge_id: i64) -> NexusResult<UserBadge> {
        let mut tables = self.tables.write().await;
        if tables
            .user_badges
            .values()
            .any(|ub| ub.user_id == user_id && ub.badge_id == badge_id)
        {
            return Err(NexusError::conflict(format!("user {user_id} already holds badge {badge_id}")));
        }
        let user_badge = UserBadge {
            id: tables.allocate_id(),
            user_id,
            badge_id,
            earned_at: get_current_timestamp(),
        };
        tables.user_badges.insert(user_badge.id, user_badge.clone());
        Ok(user_badge)
    }

    async fn list_user_badges(&self, user_id: i64) -> NexusResult<Vec<EarnedBadge>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_badges
            .values()
            .filter(|ub| ub.user_id == user_id)
            .filter_map(|ub| {
                tables.badges.get(&ub.badge_id).map(|badge| EarnedBadge {
                    badge: badge.clone(),
                    earned_at: ub.earned_at,
                })
            })
            .collect())
    }

    async fn find_rating(&self, target: Target, user_id: i64) -> NexusResult<Option<Rating>> {
        Ok(self
            .tables
            .read()
            .await
            .ratings
            .values()
            .find(|r| r.target() == target && r.user_id == user_id)
            .cloned())
    }

    async fn insert_rating(&self, target: Target, user_id: i64, score: i32) -> NexusResult<Rating> {
        let mut tables = self.tables.write().await;
        if tables.ratings.values().any(|r| r.target() == target && r.user_id == user_id) {
            return Err(NexusError::conflict(format!(
                "user {user_id} already rated {} {}",
                target.target_type, target.target_id
            )));
        }
        let rating = Rating {
            id: tables.allocate_id(),
            target_type: target.target_type,
            target_id: target.target_id,
            user_id,
            score,
            created_at: get_current_timestamp(),
        };
        tables.ratings.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn update_rating_score(&self, id: i64, score: i32) -> NexusResult<Rating> {
        let mut tables = self.tables.write().await;
        let rating = tables
            .ratings
            .get_mut(&id)
            .ok_or_else(|| NexusError::not_found(format!("rating {id}")))?;
        rating.score = score;
        Ok(rating.clone())
    }

    async fn aggregate_rating_stats(&self, target: Target) -> NexusResult<RatingStats> {
        let tables = self.tables.read().await;
        Ok(tables
            .ratings
            .values()
            .filter(|r| r.target() == target)
            .fold(RatingStats::default(), |acc, r| RatingStats {
                sum: acc.sum + r.score as i64,
                count: acc.count + 1,
            }))
    }

    async fn find_favorite(&self, target: Target, user_id: i64) -> NexusResult<Option<Favorite>> {
        Ok(self
            .tables
            .read()
            .await
            .favorites
            .values()
            .find(|f| f.target() == target && f.user_id == user_id)
            .cloned())
    }

    async fn insert_favorite(&self, target: Target, user_id: i64) -> NexusResult<Favorite> {
        let mut tables = self.tables.write().await;
        if tables.favorites.values().any(|f| f.target() == target && f.user_id == user_id) {
            return Err(NexusError::conflict(format!(
                "{} {} is already a favorite of user {user_id}",
                target.target_type, target.target_id
            )));
        }
        let favorite = Favorite {
            id: tables.allocate_id(),
            target_type: target.target_type,
            target_id: target.target_id,
            user_id,
            created_at: get_current_timestamp(),
        };
        tables.favorites.insert(favorite.id, favorite.clone());
        Ok(favorite)
    }

    async fn delete_favorites(&self, target: Target, user_id: i64) -> NexusResult<Vec<Favorite>> {
        let mut tables = self.tables.write().await;
        let ids: Vec<i64> = tables
            .favorites
            .values()
            .filter(|f| f.target() == target && f.user_id == user_id)
            .map(|f| f.id)
            .collect();
        Ok(ids.into_iter().filter_map(|id| tables.favorites.remove(&id)).collect())
    }

    async fn list_favorites_for_user(&self, user_id: i64) -> NexusResult<Vec<Favorite>> {
        Ok(self
            .tables
            .read()
            .await
            .favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_post(&self, user_id: i64, post: &CreatePost) -> NexusResult<Post> {
        let mut tables = self.tables.write().await;
        let post = Post {
            id: tables.allocate_id(),
            user_id,
            content: post.content.clone(),
            image: post.image.clone(),
            tags: post.tags.clone(),
            created_at: get_current_timestamp(),
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> NexusResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> NexusResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn search_posts(&self, query: &str) -> NexusResult<Vec<Post>> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| {
                contains_ignore_case(&p.content, &needle)
                    || p.tags.iter().any(|t| contains_ignore_case(t, &needle))
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn create_category(&self, category: &CreateCategory) -> NexusResult<ForumCategory> {
        let mut tables = self.tables.write().await;
        if tables.categories.values().any(|c| c.slug == category.slug) {
            return Err(NexusError::conflict(format!("category slug `{}` is taken", category.slug)));
        }
        let category = ForumCategory {
            id: tables.allocate_id(),
            name: category.name.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
            icon: category.icon.clone(),
            order: category.order,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> NexusResult<Option<ForumCategory>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> NexusResult<Vec<ForumCategory>> {
        let mut categories: Vec<ForumCategory> =
            self.tables.read().await.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn create_thread(&self, user_id: i64, thread: &CreateThread) -> NexusResult<ForumThread> {
        let mut tables = self.tables.write().await;
        let now = get_current_timestamp();
        let thread = ForumThread {
            id: tables.allocate_id(),
            category_id: thread.category_id,
            user_id,
            title: thread.title.clone(),
            content: thread.content.clone(),
            is_pinned: false,
            is_locked: false,
            created_at: now,
            updated_at: now,
        };
        tables.threads.insert(thread.id, thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, id: i64) -> NexusResult<Option<ForumThread>> {
        Ok(self.tables.read().await.threads.get(&id).cloned())
    }

    async fn list_threads(&self, category_id: i64) -> NexusResult<Vec<ForumThread>> {
        let tables = self.tables.read().await;
        let mut threads: Vec<ForumThread> = tables
            .threads
            .values()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect();
        threads.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.updated_at.cmp(&a.updated_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(threads)
    }

    async fn update_thread_flags(&self, id: i64, is_pinned: bool, is_locked: bool) -> NexusResult<ForumThread> {
        let mut tables = self.tables.write().await;
        let thread = tables
            .threads
            .get_mut(&id)
            .ok_or_else(|| NexusError::not_found(format!("thread {id}")))?;
        thread.is_pinned = is_pinned;
        thread.is_locked = is_locked;
        Ok(thread.clone())
    }

    async fn search_threads(&self, query: &str) -> NexusResult<Vec<ForumThread>> {
        let needle = query.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .threads
            .values()
            .filter(|t| contains_ignore_case(&t.title, &needle) || contains_ignore_case(&t.content, &needle))
            .cloned()
            .collect())
    }

    async fn create_reply(&self, thread_id: i64, user_id: i64, reply: &CreateReply) -> NexusResult<ForumReply> {
        let mut tables = self.tables.write().await;
        let now = get_current_timestamp();
        let id = tables.allocate_id();
        let thread = tables
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| NexusError::not_found(format!("thread {thread_id}")))?;
        thread.updated_at = now;

        let reply = ForumReply {
            id,
            thread_id,
            user_id,
            content: reply.content.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.replies.insert(reply.id, reply.clone());
        Ok(reply)
    }

    async fn list_replies(&self, thread_id: i64) -> NexusResult<Vec<ForumReply>> {
        Ok(self
            .tables
            .read()
            .await
            .replies
            .values()
            .filter(|r| r.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn create_project(&self, user_id: i64, project: &CreateProject) -> NexusResult<Project> {
        let mut tables = self.tables.write().await;
        let now = get_current_timestamp();
        let project = Project {
            id: tables.allocate_id(),
            name: project.name.clone(),
            description: project.description.clone(),
            repository: project.repository.clone(),
            website_url: project.website_url.clone(),
            user_id,
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.projects.insert(project.id, project.clone());
        let owner = ProjectMember {
            id: tables.allocate_id(),
            project_id: project.id,
            user_id,
            role: OWNER_ROLE.to_string(),
            joined_at: now,
        };
        tables.project_members.insert(owner.id, owner);
        Ok(project)
    }

    async fn get_project(&self, id: i64) -> NexusResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> NexusResult<Vec<Project>> {
        Ok(self.tables.read().await.projects.values().rev().cloned().collect())
    }

    async fn list_projects_for_user(&self, user_id: i64) -> NexusResult<Vec<Project>> {
        Ok(self
            .tables
            .read()
            .await
            .projects
            .values()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn search_projects(&self, query: &str) -> NexusResult<Vec<Project>> {
        let needle = query.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .projects
            .values()
            .rev()
            .filter(|p| contains_ignore_case(&p.name, &needle) || contains_ignore_case(&p.description, &needle))
            .cloned()
            .collect())
    }

    async fn add_project_member(&self, project_id: i64, user_id: i64, role: &str) -> NexusResult<ProjectMember> {
        let mut tables = self.tables.write().await;
        if tables
            .project_members
            .values()
            .any(|m| m.project_id == project_id && m.user_id == user_id)
        {
            return Err(NexusError::conflict(format!(
                "user {user_id} is already a member of project {project_id}"
            )));
        }
        let member = ProjectMember {
            id: tables.allocate_id(),
            project_id,
            user_id,
            role: role.to_string(),
            joined_at: get_current_timestamp(),
        };
        tables.project_members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn list_project_members(&self, project_id: i64) -> NexusResult<Vec<ProjectMember>> {
        Ok(self
            .tables
            .read()
            .await
            .project_members
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_template(&self, user_id: i64, template: &CreateTemplate) -> NexusResult<ContentTemplate> {
        let mut tables = self.tables.write().await;
        let template = ContentTemplate {
            id: tables.allocate_id(),
            name: template.name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            content: template.content.clone(),
            created_by: user_id,
            created_at: get_current_timestamp(),
        };
        tables.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn list_templates(&self, category: Option<&str>) -> NexusResult<Vec<ContentTemplate>> {
        Ok(self
            .tables
            .read()
            .await
            .templates
            .values()
            .rev()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .cloned()
            .collect())
    }

    async fn search_templates(&self, query: &str) -> NexusResult<Vec<ContentTemplate>> {
        let needle = query.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .templates
            .values()
            .rev()
            .filter(|t| {
                contains_ignore_case(&t.name, &needle)
                    || contains_ignore_case(&t.description, &needle)
                    || contains_ignore_case(&t.content, &needle)
            })
            .cloned()
            .collect())
    }

    async fn create_report(&self, reporter_id: i64, report: &CreateReport) -> NexusResult<Report> {
        let mut tables = self.tables.write().await;
        let now = get_current_timestamp();
        let report = Report {
            id: tables.allocate_id(),
            reporter_id,
            target_type: report.target.target_type,
            target_id: report.target.target_id,
            reason: report.reason.clone(),
            status: ReportStatus::Pending,
            moderator_id: None,
            resolution: None,
            created_at: now,
            updated_at: now,
        };
        tables.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: i64) -> NexusResult<Option<Report>> {
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self, status: Option<ReportStatus>) -> NexusResult<Vec<Report>> {
        Ok(self
            .tables
            .read()
            .await
            .reports
            .values()
            .rev()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect())
    }

    async fn review_report(&self, id: i64, moderator_id: i64, review: &ReviewReport) -> NexusResult<Report> {
        let mut tables = self.tables.write().await;
        let report = tables
            .reports
            .get_mut(&id)
            .ok_or_else(|| NexusError::not_found(format!("report {id}")))?;
        if report.status != ReportStatus::Pending {
            return Err(NexusError::conflict(format!("report {id} is already {}", report.status)));
        }
        report.status = review.status;
        report.resolution = review.resolution.clone();
        report.moderator_id = Some(moderator_id);
        report.updated_at = get_current_timestamp();
        Ok(report.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetType;

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        store.create_user("Raven", "x", UserRole::User).await.unwrap();
        let err = store.create_user("raven", "x", UserRole::User).await.unwrap_err();
        assert!(matches!(err, NexusError::Conflict(_)));
        assert!(store.find_user_by_username("RAVEN").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_favorite_insert_conflicts() {
        let store = MemoryStore::new();
        let target = Target::new(TargetType::Project, 5);
        store.insert_favorite(target, 1).await.unwrap();
        assert!(matches!(store.insert_favorite(target, 1).await, Err(NexusError::Conflict(_))));
        assert!(store.insert_favorite(target, 2).await.is_ok());
    }

    #[tokio::test]
    async fn reply_bumps_thread_and_missing_thread_is_not_found() {
        let store = MemoryStore::new();
        let thread = store
            .create_thread(1, &CreateThread { category_id: 1, title: "t".into(), content: "c".into() })
            .await
            .unwrap();
        store.create_reply(thread.id, 2, &CreateReply { content: "r".into() }).await.unwrap();
        assert_eq!(store.list_replies(thread.id).await.unwrap().len(), 1);

        let err = store.create_reply(999, 2, &CreateReply { content: "r".into() }).await.unwrap_err();
        assert!(matches!(err, NexusError::NotFound(_)));
    }

    #[tokio::test]
    async fn new_project_lists_creator_as_owner() {
        let store = MemoryStore::new();
        let project = store
            .create_project(
                4,
                &CreateProject {
                    name: "Shadow Atlas".into(),
                    description: "maps".into(),
                    repository: None,
                    website_url: None,
                },
            )
            .await
            .unwrap();
        let members = store.list_project_members(project.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, 4);
        assert_eq!(members[0].role, OWNER_ROLE);
    }

    #[tokio::test]
    async fn report_review_applies_once() {
        let store = MemoryStore::new();
        let report = store
            .create_report(
                1,
                &CreateReport { target: Target::new(TargetType::Thread, 3), reason: "spam".into() },
            )
            .await
            .unwrap();
        let accept = ReviewReport { status: ReportStatus::Accepted, resolution: Some("locked".into()) };
        let reject = ReviewReport { status: ReportStatus::Rejected, resolution: None };

        let reviewed = store.review_report(report.id, 7, &accept).await.unwrap();
        assert_eq!(reviewed.status, ReportStatus::Accepted);

        let err = store.review_report(report.id, 8, &reject).await.unwrap_err();
        assert!(matches!(err, NexusError::Conflict(_)));
        let stored = store.get_report(report.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Accepted);
        assert_eq!(stored.moderator_id, Some(7));

        assert!(matches!(store.review_report(404, 7, &accept).await, Err(NexusError::NotFound(_))));
    }

    #[tokio::test]
    async fn pinned_threads_sort_first() {
        let store = MemoryStore::new();
        let first = store
            .create_thread(1, &CreateThread { category_id: 3, title: "a".into(), content: "a".into() })
            .await
            .unwrap();
        store
            .create_thread(1, &CreateThread { category_id: 3, title: "b".into(), content: "b".into() })
            .await
            .unwrap();
        store.update_thread_flags(first.id, true, false).await.unwrap();

        let threads = store.list_threads(3).await.unwrap();
        assert_eq!(threads[0].id, first.id);
        assert!(threads[0].is_pinned);
    }
}
