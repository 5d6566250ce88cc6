use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, CreateBadge, CreateBadgeRequest};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn badge_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/badges",
            get(list_badges)
            .merge(
                post(create_badge)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
}

async fn list_badges(
    State(state): State<GlobalState>,
) -> Result<AppSuccess, AppError> {
    let badges = state.nexus.badges.catalog().await?;
    Ok(AppSuccess::new(StatusCode::OK, "Badges fetched successfully", json!(badges)))
}

async fn create_badge(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateBadgeRequest>,
) -> Result<AppSuccess, AppError> {
    let badge = CreateBadge::try_from(payload)?;
    let badge = state.nexus.badges.create(&caller, &badge).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Badge created successfully", json!(badge)))
}
