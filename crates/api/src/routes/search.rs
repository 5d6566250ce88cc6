use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use nexus_runtime::{NexusError, SearchKind};

use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn search_routes() -> Router<GlobalState> {
    Router::new()
        .route("/api/search/{kind}",
            get(search)
        )
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

async fn search(
    State(state): State<GlobalState>,
    Path(kind): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<AppSuccess, AppError> {
    let kind = kind
        .parse::<SearchKind>()
        .map_err(|_| NexusError::invalid(format!("cannot search `{kind}`")))?;
    let results = state.nexus.search.run(kind, query.q.as_deref().unwrap_or_default()).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Search completed successfully", json!(results)))
}
