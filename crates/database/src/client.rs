use nexus_common::{define_module_client, EnvVars};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::env::PostgresEnv;

define_module_client! {
    (struct PostgresClient, "postgres")
    client_type: PgPool,
    env: ["DATABASE_URL"],
    setup: async {
        let env = PostgresEnv::load()?;
        let pool = PgPoolOptions::new()
            .max_connections(env.max_connections)
            .connect(&env.database_url)
            .await?;
        tracing::info!("[PostgresClient] connected (max {} connections)", env.max_connections);
        anyhow::Ok(pool)
    }
}
