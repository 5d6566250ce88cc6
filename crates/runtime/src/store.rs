use std::sync::Arc;

use async_trait::async_trait;

use crate::commands::{
    CreateBadge, CreateCategory, CreatePost, CreateProject, CreateReply, CreateReport,
    CreateTemplate, CreateThread, ReviewReport,
};
use crate::content::{
    ContentTemplate, ForumCategory, ForumReply, ForumThread, Post, Project, ProjectMember, Report,
    ReportStatus,
};
use crate::error::NexusResult;
use crate::rating::{Rating, RatingStats};
use crate::target::Target;
use crate::user::{Badge, EarnedBadge, Favorite, User, UserBadge, UserRole};

pub type SharedStore = Arc<dyn NexusStore>;

/// Persistence boundary. Every method is one atomic step against the backing store.
///
/// Uniqueness (username, category slug, `(user, badge)`, rating and favorite triples,
/// project membership) is enforced by the store and reported as `NexusError::Conflict`.
/// Lookups of a single row by id return `Ok(None)` when absent; updates of a missing row
/// return `NexusError::NotFound`.
#[async_trait]
pub trait NexusStore: Send + Sync + 'static {
    /* users */
    async fn create_user(&self, username: &str, password_hash: &str, role: UserRole) -> NexusResult<User>;
    async fn get_user(&self, id: i64) -> NexusResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> NexusResult<Option<User>>;
    async fn update_user_experience_and_level(&self, id: i64, experience: i64, level: i64) -> NexusResult<User>;
    async fn update_user_role(&self, id: i64, role: UserRole) -> NexusResult<User>;
    async fn search_users(&self, query: &str) -> NexusResult<Vec<User>>;

    /* badges */
    async fn create_badge(&self, badge: &CreateBadge) -> NexusResult<Badge>;
    async fn get_badge(&self, id: i64) -> NexusResult<Option<Badge>>;
    async fn list_badges(&self) -> NexusResult<Vec<Badge>>;
    async fn find_user_badge(&self, user_id: i64, badge_id: i64) -> NexusResult<Option<UserBadge>>;
    async fn insert_user_badge(&self, user_id: i64, badge_id: i64) -> NexusResult<UserBadge>;
    async fn list_user_badges(&self, user_id: i64) -> NexusResult<Vec<EarnedBadge>>;

    /* ratings */
    async fn find_rating(&self, target: Target, user_id: i64) -> NexusResult<Option<Rating>>;
    async fn insert_rating(&self, target: Target, user_id: i64, score: i32) -> NexusResult<Rating>;
    async fn update_rating_score(&self, id: i64, score: i32) -> NexusResult<Rating>;
    async fn aggregate_rating_stats(&self, target: Target) -> NexusResult<RatingStats>;

    /* favorites */
    async fn find_favorite(&self, target: Target, user_id: i64) -> NexusResult<Option<Favorite>>;
    async fn insert_favorite(&self, target: Target, user_id: i64) -> NexusResult<Favorite>;
    async fn delete_favorites(&self, target: Target, user_id: i64) -> NexusResult<Vec<Favorite>>;
    async fn list_favorites_for_user(&self, user_id: i64) -> NexusResult<Vec<Favorite>>;

    /* posts */
    async fn create_post(&self, user_id: i64, post: &CreatePost) -> NexusResult<Post>;
    async fn get_post(&self, id: i64) -> NexusResult<Option<Post>>;
    /// Newest first.
    async fn list_posts(&self) -> NexusResult<Vec<Post>>;
    async fn search_posts(&self, query: &str) -> NexusResult<Vec<Post>>;

    /* forum */
    async fn create_category(&self, category: &CreateCategory) -> NexusResult<ForumCategory>;
    async fn get_category(&self, id: i64) -> NexusResult<Option<ForumCategory>>;
    /// Ordered by `order`, then name.
    async fn list_categories(&self) -> NexusResult<Vec<ForumCategory>>;
    async fn create_thread(&self, user_id: i64, thread: &CreateThread) -> NexusResult<ForumThread>;
    async fn get_thread(&self, id: i64) -> NexusResult<Option<ForumThread>>;
    /// Pinned threads first, then most recently updated.
    async fn list_threads(&self, category_id: i64) -> NexusResult<Vec<ForumThread>>;
    async fn update_thread_flags(&self, id: i64, is_pinned: bool, is_locked: bool) -> NexusResult<ForumThread>;
    async fn search_threads(&self, query: &str) -> NexusResult<Vec<ForumThread>>;
    /// Inserts the reply and bumps the thread's `updated_at` in one step.
    async fn create_reply(&self, thread_id: i64, user_id: i64, reply: &CreateReply) -> NexusResult<ForumReply>;
    /// Oldest first.
    async fn list_replies(&self, thread_id: i64) -> NexusResult<Vec<ForumReply>>;

    /* projects */
    /// Also records the creator as the project's owner, atomically.
    async fn create_project(&self, user_id: i64, project: &CreateProject) -> NexusResult<Project>;
    async fn get_project(&self, id: i64) -> NexusResult<Option<Project>>;
    /// Newest first.
    async fn list_projects(&self) -> NexusResult<Vec<Project>>;
    async fn list_projects_for_user(&self, user_id: i64) -> NexusResult<Vec<Project>>;
    async fn search_projects(&self, query: &str) -> NexusResult<Vec<Project>>;
    async fn add_project_member(&self, project_id: i64, user_id: i64, role: &str) -> NexusResult<ProjectMember>;
    async fn list_project_members(&self, project_id: i64) -> NexusResult<Vec<ProjectMember>>;

    /* templates */
    async fn create_template(&self, user_id: i64, template: &CreateTemplate) -> NexusResult<ContentTemplate>;
    async fn list_templates(&self, category: Option<&str>) -> NexusResult<Vec<ContentTemplate>>;
    async fn search_templates(&self, query: &str) -> NexusResult<Vec<ContentTemplate>>;

    /* reports */
    async fn create_report(&self, reporter_id: i64, report: &CreateReport) -> NexusResult<Report>;
    async fn get_report(&self, id: i64) -> NexusResult<Option<Report>>;
    /// Newest first.
    async fn list_reports(&self, status: Option<ReportStatus>) -> NexusResult<Vec<Report>>;
    /// Only a pending report can be reviewed; anything else is a `Conflict`.
    async fn review_report(&self, id: i64, moderator_id: i64, review: &ReviewReport) -> NexusResult<Report>;
}
