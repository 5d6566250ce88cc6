use std::sync::Arc;

use anyhow::Result;
use nexus_common::{EnvVars, ModuleClient};
use nexus_database::{init_schema, PgStore, PostgresClient};
use nexus_runtime::{AccountSettings, MemoryStore, Nexus, SharedStore};

use crate::env::ApiServerEnv;

#[derive(Clone)]
pub struct GlobalState {
    pub nexus: Nexus,
}

impl GlobalState {
    pub fn new(store: SharedStore, settings: AccountSettings) -> Self {
        Self { nexus: Nexus::new(store, settings) }
    }

    /// PostgreSQL when `DATABASE_URL` is set, otherwise a process-local store.
    pub async fn from_env(env: &ApiServerEnv) -> Result<Self> {
        let store: SharedStore = match &env.database_url {
            Some(_) => {
                let db = PostgresClient::setup_connection().await?;
                let store = PgStore::from_client(&db);
                init_schema(store.pool(), false, env.create_tables).await?;
                Arc::new(store)
            }
            None => {
                tracing::warn!("DATABASE_URL is not set; data lives in memory and is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let settings = AccountSettings {
            secret: env.get_env_var("SECRET_SALT"),
            session_ttl_secs: env.session_ttl_secs,
            admin_usernames: env.admin_usernames.clone(),
        };
        Ok(Self::new(store, settings))
    }
}
