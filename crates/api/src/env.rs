use std::env;

use anyhow::{anyhow, Result};
use nexus_common::{env_or, EnvVars};

pub struct ApiServerEnv {
    pub secret_salt: String,
    pub port: u16,
    pub session_ttl_secs: i64,
    pub admin_usernames: Vec<String>,
    pub request_timeout_secs: u64,
    pub database_url: Option<String>,
    pub create_tables: bool,
}

impl EnvVars for ApiServerEnv {
    fn load() -> Result<Self> {
        let secret_salt = env::var("SECRET_SALT").map_err(|_| anyhow!("SECRET_SALT is not set"))?;
        if secret_salt.trim().is_empty() {
            return Err(anyhow!("SECRET_SALT must not be empty"));
        }

        let admin_usernames = env::var("ADMIN_USERNAMES")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            secret_salt,
            port: env_or("PORT", 3033)?,
            session_ttl_secs: env_or("SESSION_TTL_SECS", 7 * 24 * 60 * 60)?,
            admin_usernames,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            create_tables: env_or("DB_CREATE_TABLES", true)?,
        })
    }

    fn get_env_var(&self, key: &str) -> String {
        match key {
            "SECRET_SALT" => self.secret_salt.clone(),
            "PORT" => self.port.to_string(),
            "SESSION_TTL_SECS" => self.session_ttl_secs.to_string(),
            "ADMIN_USERNAMES" => self.admin_usernames.join(","),
            "REQUEST_TIMEOUT_SECS" => self.request_timeout_secs.to_string(),
            "DATABASE_URL" => self.database_url.clone().unwrap_or_default(),
            "DB_CREATE_TABLES" => self.create_tables.to_string(),
            _ => String::new(),
        }
    }
}
