use std::env;

use anyhow::{anyhow, Result};
use nexus_common::{env_or, EnvVars};

pub struct PostgresEnv {
    pub database_url: String,
    pub max_connections: u32,
    pub create_tables: bool,
}

impl EnvVars for PostgresEnv {
    fn load() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL is not set"))?,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            create_tables: env_or("DB_CREATE_TABLES", true)?,
        })
    }

    fn get_env_var(&self, key: &str) -> String {
        match key {
            "DATABASE_URL" => self.database_url.clone(),
            "DB_MAX_CONNECTIONS" => self.max_connections.to_string(),
            "DB_CREATE_TABLES" => self.create_tables.to_string(),
            _ => String::new(),
        }
    }
}
