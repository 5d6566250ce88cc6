use anyhow::{Context, Result};
use sqlx::PgPool;

/// DDL for one table. Tables are listed so that referenced tables come first.
pub struct TableSchema {
    pub name: &'static str,
    pub create_sql: &'static str,
    pub indexes_sql: &'static [&'static str],
}

impl TableSchema {
    pub fn drop_table_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE", self.name)
    }
}

pub const TABLES: &[TableSchema] = &[
    TableSchema {
        name: "users",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                avatar TEXT,
                bio TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                level BIGINT NOT NULL DEFAULT 1,
                experience BIGINT NOT NULL DEFAULT 0 CHECK (experience >= 0),
                created_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username_lower ON users (LOWER(username))"],
    },
    TableSchema {
        name: "badges",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS badges (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                icon TEXT NOT NULL
            )"#,
        indexes_sql: &[],
    },
    TableSchema {
        name: "user_badges",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS user_badges (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                badge_id BIGINT NOT NULL REFERENCES badges(id) ON DELETE CASCADE,
                earned_at BIGINT NOT NULL,
                UNIQUE (user_id, badge_id)
            )"#,
        indexes_sql: &[],
    },
    TableSchema {
        name: "ratings",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS ratings (
                id BIGSERIAL PRIMARY KEY,
                target_type TEXT NOT NULL,
                target_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
                created_at BIGINT NOT NULL,
                UNIQUE (target_type, target_id, user_id)
            )"#,
        indexes_sql: &[],
    },
    TableSchema {
        name: "favorites",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id BIGSERIAL PRIMARY KEY,
                target_type TEXT NOT NULL,
                target_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at BIGINT NOT NULL,
                UNIQUE (target_type, target_id, user_id)
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_favorites_user_id ON favorites (user_id)"],
    },
    TableSchema {
        name: "posts",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS posts (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                image TEXT,
                tags TEXT[] NOT NULL DEFAULT '{}',
                created_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC)"],
    },
    TableSchema {
        name: "forum_categories",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS forum_categories (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                icon TEXT,
                "order" INTEGER NOT NULL DEFAULT 0
            )"#,
        indexes_sql: &[],
    },
    TableSchema {
        name: "forum_threads",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS forum_threads (
                id BIGSERIAL PRIMARY KEY,
                category_id BIGINT NOT NULL REFERENCES forum_categories(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                is_pinned BOOLEAN NOT NULL DEFAULT FALSE,
                is_locked BOOLEAN NOT NULL DEFAULT FALSE,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_forum_threads_category_id ON forum_threads (category_id)"],
    },
    TableSchema {
        name: "forum_replies",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS forum_replies (
                id BIGSERIAL PRIMARY KEY,
                thread_id BIGINT NOT NULL REFERENCES forum_threads(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_forum_replies_thread_id ON forum_replies (thread_id)"],
    },
    TableSchema {
        name: "projects",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS projects (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                repository TEXT,
                website_url TEXT,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'active',
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_projects_user_id ON projects (user_id)"],
    },
    TableSchema {
        name: "project_members",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS project_members (
                id BIGSERIAL PRIMARY KEY,
                project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                joined_at BIGINT NOT NULL,
                UNIQUE (project_id, user_id)
            )"#,
        indexes_sql: &[],
    },
    TableSchema {
        name: "content_templates",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS content_templates (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                content TEXT NOT NULL,
                created_by BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_content_templates_category ON content_templates (category)"],
    },
    TableSchema {
        name: "reports",
        create_sql: r#"
            CREATE TABLE IF NOT EXISTS reports (
                id BIGSERIAL PRIMARY KEY,
                reporter_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                target_type TEXT NOT NULL,
                target_id BIGINT NOT NULL,
                reason TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                moderator_id BIGINT REFERENCES users(id) ON DELETE SET NULL,
                resolution TEXT,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            )"#,
        indexes_sql: &["CREATE INDEX IF NOT EXISTS idx_reports_status ON reports (status)"],
    },
];

/// Drops and/or creates every table with its indexes.
pub async fn init_schema(pool: &PgPool, drop_tables: bool, create_tables: bool) -> Result<()> {
    if drop_tables {
        for table in TABLES.iter().rev() {
            sqlx::query(&table.drop_table_sql())
                .execute(pool)
                .await
                .with_context(|| format!("Failed to drop table '{}'", table.name))?;
        }
    }

    if create_tables {
        for table in TABLES {
            sqlx::query(table.create_sql)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to create table '{}'", table.name))?;

            for index_sql in table.indexes_sql {
                sqlx::query(index_sql)
                    .execute(pool)
                    .await
                    .with_context(|| format!("Failed to create index for '{}'. SQL: {}", table.name, index_sql))?;
            }
        }
        tracing::info!("[init_schema] {} tables ready", TABLES.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_tables_are_created_first() {
        let position = |name: &str| TABLES.iter().position(|t| t.name == name).unwrap();
        for table in TABLES {
            for (referenced, _) in table.create_sql.match_indices("REFERENCES ") {
                let rest = &table.create_sql[referenced + "REFERENCES ".len()..];
                let target = &rest[..rest.find('(').unwrap()];
                assert!(position(target) < position(table.name), "{} before {}", target, table.name);
            }
        }
    }
}
