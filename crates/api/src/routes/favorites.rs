use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, Target, TargetRequest};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn favorite_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/favorites",
            get(list_favorites)
            .post(add_favorite)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
        .route("/api/favorites/{target_type}/{target_id}",
            delete(remove_favorite)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
}

async fn list_favorites(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<AppSuccess, AppError> {
    let favorites = state.nexus.favorites.list_for_user(caller.id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Favorites fetched successfully", json!(favorites)))
}

async fn add_favorite(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<TargetRequest>,
) -> Result<AppSuccess, AppError> {
    let target = Target::try_from(payload)?;
    let favorite = state.nexus.favorites.add(target, caller.id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Favorite added successfully", json!(favorite)))
}

async fn remove_favorite(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path((target_type, target_id)): Path<(String, i64)>,
) -> Result<AppSuccess, AppError> {
    let target = Target::parse(&target_type, target_id)?;
    let removed = state.nexus.favorites.remove(target, caller.id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Favorite removed successfully", json!(removed)))
}
