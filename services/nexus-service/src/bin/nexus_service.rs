use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use nexus_api::{build_router, setup_tracing, ApiServerEnv, GlobalState};
use nexus_common::EnvVars;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let env = ApiServerEnv::load()?;
    let global_state = GlobalState::from_env(&env).await?;

    let cors = CorsLayer::very_permissive();
    let trace = TraceLayer::new_for_http();

    let app = build_router(global_state)
        .layer(TimeoutLayer::new(Duration::from_secs(env.request_timeout_secs)))
        .layer(cors)
        .layer(trace);

    let port = env.port;
    let listener = tokio::net::TcpListener::bind(format!(":::{port}")).await?;

    tracing::info!("LISTENING ON {port}");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
