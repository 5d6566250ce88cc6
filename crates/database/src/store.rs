use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Postgres};

use nexus_common::{get_current_timestamp, ModuleClient};
use nexus_runtime::{
    Badge, ContentTemplate, CreateBadge, CreateCategory, CreatePost, CreateProject, CreateReply,
    CreateReport, CreateTemplate, CreateThread, EarnedBadge, Favorite, ForumCategory, ForumReply,
    ForumThread, NexusError, NexusResult, NexusStore, Post, Project, ProjectMember, Rating,
    RatingStats, Report, ReportStatus, ReviewReport, Target, User, UserBadge, UserRole,
    OWNER_ROLE,
};

use crate::client::PostgresClient;
use crate::criteria::{like_pattern, OrderDirection, QueryCriteria};
use crate::error::db_err;

/// `NexusStore` over PostgreSQL. Expects the tables from [`crate::TABLES`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn from_client(client: &PostgresClient) -> Self {
        Self::new(PgPool::clone(client.get_client()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find<T>(&self, table: &'static str, criteria: QueryCriteria) -> NexusResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let (sql, args) = criteria.build_select(table).map_err(db_err(table))?;
        sqlx::query_as_with::<Postgres, T, _>(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err(table))
    }

    async fn find_one<T>(&self, table: &'static str, criteria: QueryCriteria) -> NexusResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut rows = self.find(table, criteria.limit(1)).await?;
        Ok(rows.pop())
    }

    async fn find_by_id<T>(&self, table: &'static str, id: i64) -> NexusResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.find_one(table, QueryCriteria::new().add_valued_filter("id", "=", id)).await
    }
}

fn target_criteria(target: Target, user_id: i64) -> QueryCriteria {
    QueryCriteria::new()
        .add_valued_filter("target_type", "=", target.target_type.to_string())
        .add_valued_filter("target_id", "=", target.target_id)
        .add_valued_filter("user_id", "=", user_id)
}

#[async_trait]
impl NexusStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str, role: UserRole) -> NexusResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, role, level, experience, created_at)
             VALUES ($1, $2, $3, 1, 0, $4) RETURNING *",
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.to_string())
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("user"))
    }

    async fn get_user(&self, id: i64) -> NexusResult<Option<User>> {
        self.find_by_id("users", id).await
    }

    async fn find_user_by_username(&self, username: &str) -> NexusResult<Option<User>> {
        let criteria = QueryCriteria::new().add_valued_filter("LOWER(username)", "=", username.to_lowercase());
        self.find_one("users", criteria).await
    }

    async fn update_user_experience_and_level(&self, id: i64, experience: i64, level: i64) -> NexusResult<User> {
        sqlx::query_as::<_, User>("UPDATE users SET experience = $2, level = $3 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(experience)
            .bind(level)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("user"))
    }

    async fn update_user_role(&self, id: i64, role: UserRole) -> NexusResult<User> {
        sqlx::query_as::<_, User>("UPDATE users SET role = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(role.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("user"))
    }

    async fn search_users(&self, query: &str) -> NexusResult<Vec<User>> {
        let criteria = QueryCriteria::new()
            .add_any_filter(&["username", "bio"], "ILIKE", like_pattern(query))
            .order_by("id", OrderDirection::Asc);
        self.find("users", criteria).await
    }

    async fn create_badge(&self, badge: &CreateBadge) -> NexusResult<Badge> {
        sqlx::query_as::<_, Badge>("INSERT INTO badges (name, description, icon) VALUES ($1, $2, $3) RETURNING *")
            .bind(&badge.name)
            .bind(&badge.description)
            .bind(&badge.icon)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("badge"))
    }

    async fn get_badge(&self, id: i64) -> NexusResult<Option<Badge>> {
        self.find_by_id("badges", id).await
    }

    async fn list_badges(&self) -> NexusResult<Vec<Badge>> {
        self.find("badges", QueryCriteria::new().order_by("id", OrderDirection::Asc)).await
    }

    async fn find_user_badge(&self, user_id: i64, badge_id: i64) -> NexusResult<Option<UserBadge>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("user_id", "=", user_id)
            .add_valued_filter("badge_id", "=", badge_id);
        self.find_one("user_badges", criteria).await
    }

    async fn insert_user_badge(&self, user_id: i64, badge_id: i64) -> NexusResult<UserBadge> {
        sqlx::query_as::<_, UserBadge>(
            "INSERT INTO user_badges (user_id, badge_id, earned_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(badge_id)
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("user badge"))
    }

    async fn list_user_badges(&self, user_id: i64) -> NexusResult<Vec<EarnedBadge>> {
        sqlx::query_as::<_, EarnedBadge>(
            "SELECT b.id, b.name, b.description, b.icon, ub.earned_at
             FROM user_badges ub JOIN badges b ON b.id = ub.badge_id
             WHERE ub.user_id = $1 ORDER BY ub.id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("user badge"))
    }

    async fn find_rating(&self, target: Target, user_id: i64) -> NexusResult<Option<Rating>> {
        self.find_one("ratings", target_criteria(target, user_id)).await
    }

    async fn insert_rating(&self, target: Target, user_id: i64, score: i32) -> NexusResult<Rating> {
        sqlx::query_as::<_, Rating>(
            "INSERT INTO ratings (target_type, target_id, user_id, score, created_at)
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(target.target_type.to_string())
        .bind(target.target_id)
        .bind(user_id)
        .bind(score)
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("rating"))
    }

    async fn update_rating_score(&self, id: i64, score: i32) -> NexusResult<Rating> {
        sqlx::query_as::<_, Rating>("UPDATE ratings SET score = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(score)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("rating"))
    }

    async fn aggregate_rating_stats(&self, target: Target) -> NexusResult<RatingStats> {
        sqlx::query_as::<_, RatingStats>(
            "SELECT COALESCE(SUM(score), 0)::BIGINT AS sum, COUNT(*) AS count
             FROM ratings WHERE target_type = $1 AND target_id = $2",
        )
        .bind(target.target_type.to_string())
        .bind(target.target_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("rating"))
    }

    async fn find_favorite(&self, target: Target, user_id: i64) -> NexusResult<Option<Favorite>> {
        self.find_one("favorites", target_criteria(target, user_id)).await
    }

    async fn insert_favorite(&self, target: Target, user_id: i64) -> NexusResult<Favorite> {
        sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (target_type, target_id, user_id, created_at)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(target.target_type.to_string())
        .bind(target.target_id)
        .bind(user_id)
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("favorite"))
    }

    async fn delete_favorites(&self, target: Target, user_id: i64) -> NexusResult<Vec<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            "DELETE FROM favorites WHERE target_type = $1 AND target_id = $2 AND user_id = $3 RETURNING *",
        )
        .bind(target.target_type.to_string())
        .bind(target.target_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("favorite"))
    }

    async fn list_favorites_for_user(&self, user_id: i64) -> NexusResult<Vec<Favorite>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("user_id", "=", user_id)
            .order_by("id", OrderDirection::Asc);
        self.find("favorites", criteria).await
    }

    async fn create_post(&self, user_id: i64, post: &CreatePost) -> NexusResult<Post> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (user_id, content, image, tags, created_at)
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(user_id)
        .bind(&post.content)
        .bind(&post.image)
        .bind(&post.tags)
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("post"))
    }

    async fn get_post(&self, id: i64) -> NexusResult<Option<Post>> {
        self.find_by_id("posts", id).await
    }

    async fn list_posts(&self) -> NexusResult<Vec<Post>> {
        let criteria = QueryCriteria::new()
            .order_by("created_at", OrderDirection::Desc)
            .order_by("id", OrderDirection::Desc);
        self.find("posts", criteria).await
    }

    async fn search_posts(&self, query: &str) -> NexusResult<Vec<Post>> {
        let criteria = QueryCriteria::new()
            .add_any_filter(&["content", "array_to_string(tags, ' ')"], "ILIKE", like_pattern(query))
            .order_by("created_at", OrderDirection::Desc)
            .order_by("id", OrderDirection::Desc);
        self.find("posts", criteria).await
    }

    async fn create_category(&self, category: &CreateCategory) -> NexusResult<ForumCategory> {
        sqlx::query_as::<_, ForumCategory>(
            r#"INSERT INTO forum_categories (name, description, slug, icon, "order")
               VALUES ($1, $2, $3, $4, $5) RETURNING *"#,
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.slug)
        .bind(&category.icon)
        .bind(category.order)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("forum category"))
    }

    async fn get_category(&self, id: i64) -> NexusResult<Option<ForumCategory>> {
        self.find_by_id("forum_categories", id).await
    }

    async fn list_categories(&self) -> NexusResult<Vec<ForumCategory>> {
        let criteria = QueryCriteria::new()
            .order_by(r#""order""#, OrderDirection::Asc)
            .order_by("name", OrderDirection::Asc);
        self.find("forum_categories", criteria).await
    }

    async fn create_thread(&self, user_id: i64, thread: &CreateThread) -> NexusResult<ForumThread> {
        let now = get_current_timestamp();
        sqlx::query_as::<_, ForumThread>(
            "INSERT INTO forum_threads (category_id, user_id, title, content, is_pinned, is_locked, created_at, updated_at)
             VALUES ($1, $2, $3, $4, FALSE, FALSE, $5, $5) RETURNING *",
        )
        .bind(thread.category_id)
        .bind(user_id)
        .bind(&thread.title)
        .bind(&thread.content)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("thread"))
    }

    async fn get_thread(&self, id: i64) -> NexusResult<Option<ForumThread>> {
        self.find_by_id("forum_threads", id).await
    }

    async fn list_threads(&self, category_id: i64) -> NexusResult<Vec<ForumThread>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("category_id", "=", category_id)
            .order_by("is_pinned", OrderDirection::Desc)
            .order_by("updated_at", OrderDirection::Desc)
            .order_by("id", OrderDirection::Desc);
        self.find("forum_threads", criteria).await
    }

    async fn update_thread_flags(&self, id: i64, is_pinned: bool, is_locked: bool) -> NexusResult<ForumThread> {
        sqlx::query_as::<_, ForumThread>(
            "UPDATE forum_threads SET is_pinned = $2, is_locked = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_pinned)
        .bind(is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("thread"))
    }

    async fn search_threads(&self, query: &str) -> NexusResult<Vec<ForumThread>> {
        let criteria = QueryCriteria::new()
            .add_any_filter(&["title", "content"], "ILIKE", like_pattern(query))
            .order_by("updated_at", OrderDirection::Desc)
            .order_by("id", OrderDirection::Desc);
        self.find("forum_threads", criteria).await
    }

    async fn create_reply(&self, thread_id: i64, user_id: i64, reply: &CreateReply) -> NexusResult<ForumReply> {
        let now = get_current_timestamp();
        let mut tx = self.pool.begin().await.map_err(db_err("reply"))?;

        sqlx::query_scalar::<_, i64>("UPDATE forum_threads SET updated_at = $2 WHERE id = $1 RETURNING id")
            .bind(thread_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err("thread"))?;

        let reply = sqlx::query_as::<_, ForumReply>(
            "INSERT INTO forum_replies (thread_id, user_id, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4) RETURNING *",
        )
        .bind(thread_id)
        .bind(user_id)
        .bind(&reply.content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("reply"))?;

        tx.commit().await.map_err(db_err("reply"))?;
        Ok(reply)
    }

    async fn list_replies(&self, thread_id: i64) -> NexusResult<Vec<ForumReply>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("thread_id", "=", thread_id)
            .order_by("id", OrderDirection::Asc);
        self.find("forum_replies", criteria).await
    }

    async fn create_project(&self, user_id: i64, project: &CreateProject) -> NexusResult<Project> {
        let now = get_current_timestamp();
        let mut tx = self.pool.begin().await.map_err(db_err("project"))?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, description, repository, website_url, user_id, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, 'active', $6, $6) RETURNING *",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.repository)
        .bind(&project.website_url)
        .bind(user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("project"))?;

        sqlx::query("INSERT INTO project_members (project_id, user_id, role, joined_at) VALUES ($1, $2, $3, $4)")
            .bind(project.id)
            .bind(user_id)
            .bind(OWNER_ROLE)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err("project membership"))?;

        tx.commit().await.map_err(db_err("project"))?;
        Ok(project)
    }

    async fn get_project(&self, id: i64) -> NexusResult<Option<Project>> {
        self.find_by_id("projects", id).await
    }

    async fn list_projects(&self) -> NexusResult<Vec<Project>> {
        self.find("projects", QueryCriteria::new().order_by("id", OrderDirection::Desc)).await
    }

    async fn list_projects_for_user(&self, user_id: i64) -> NexusResult<Vec<Project>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("user_id", "=", user_id)
            .order_by("id", OrderDirection::Desc);
        self.find("projects", criteria).await
    }

    async fn search_projects(&self, query: &str) -> NexusResult<Vec<Project>> {
        let criteria = QueryCriteria::new()
            .add_any_filter(&["name", "description"], "ILIKE", like_pattern(query))
            .order_by("id", OrderDirection::Desc);
        self.find("projects", criteria).await
    }

    async fn add_project_member(&self, project_id: i64, user_id: i64, role: &str) -> NexusResult<ProjectMember> {
        sqlx::query_as::<_, ProjectMember>(
            "INSERT INTO project_members (project_id, user_id, role, joined_at)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("project membership"))
    }

    async fn list_project_members(&self, project_id: i64) -> NexusResult<Vec<ProjectMember>> {
        let criteria = QueryCriteria::new()
            .add_valued_filter("project_id", "=", project_id)
            .order_by("id", OrderDirection::Asc);
        self.find("project_members", criteria).await
    }

    async fn create_template(&self, user_id: i64, template: &CreateTemplate) -> NexusResult<ContentTemplate> {
        sqlx::query_as::<_, ContentTemplate>(
            "INSERT INTO content_templates (name, description, category, content, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.category)
        .bind(&template.content)
        .bind(user_id)
        .bind(get_current_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("template"))
    }

    async fn list_templates(&self, category: Option<&str>) -> NexusResult<Vec<ContentTemplate>> {
        let mut criteria = QueryCriteria::new();
        if let Some(category) = category {
            criteria = criteria.add_valued_filter("category", "=", category.to_string());
        }
        self.find("content_templates", criteria.order_by("id", OrderDirection::Desc)).await
    }

    async fn search_templates(&self, query: &str) -> NexusResult<Vec<ContentTemplate>> {
        let criteria = QueryCriteria::new()
            .add_any_filter(&["name", "description", "content"], "ILIKE", like_pattern(query))
            .order_by("id", OrderDirection::Desc);
        self.find("content_templates", criteria).await
    }

    async fn create_report(&self, reporter_id: i64, report: &CreateReport) -> NexusResult<Report> {
        let now = get_current_timestamp();
        sqlx::query_as::<_, Report>(
            "INSERT INTO reports (reporter_id, target_type, target_id, reason, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING *",
        )
        .bind(reporter_id)
        .bind(report.target.target_type.to_string())
        .bind(report.target.target_id)
        .bind(&report.reason)
        .bind(ReportStatus::Pending.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("report"))
    }

    async fn get_report(&self, id: i64) -> NexusResult<Option<Report>> {
        self.find_by_id("reports", id).await
    }

    async fn list_reports(&self, status: Option<ReportStatus>) -> NexusResult<Vec<Report>> {
        let mut criteria = QueryCriteria::new();
        if let Some(status) = status {
            criteria = criteria.add_valued_filter("status", "=", status.to_string());
        }
        self.find("reports", criteria.order_by("id", OrderDirection::Desc)).await
    }

    async fn review_report(&self, id: i64, moderator_id: i64, review: &ReviewReport) -> NexusResult<Report> {
        let reviewed = sqlx::query_as::<_, Report>(
            "UPDATE reports SET status = $2, resolution = $3, moderator_id = $4, updated_at = $5
             WHERE id = $1 AND status = $6 RETURNING *",
        )
        .bind(id)
        .bind(review.status.to_string())
        .bind(&review.resolution)
        .bind(moderator_id)
        .bind(get_current_timestamp())
        .bind(ReportStatus::Pending.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("report"))?;

        match reviewed {
            Some(report) => Ok(report),
            None => match self.get_report(id).await? {
                Some(report) => Err(NexusError::conflict(format!("report {id} is already {}", report.status))),
                None => Err(NexusError::not_found(format!("report {id}"))),
            },
        }
    }
}
