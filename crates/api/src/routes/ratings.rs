use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, RateRequest, RateTarget, Target};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn rating_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/ratings",
            post(rate)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
        .route("/api/ratings/{target_type}/{target_id}/average",
            get(average)
        )
}

async fn rate(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<RateRequest>,
) -> Result<AppSuccess, AppError> {
    let RateTarget { target, score } = RateTarget::try_from(payload)?;
    let rating = state.nexus.ratings.rate(target, caller.id, score).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Rated successfully", json!(rating)))
}

async fn average(
    State(state): State<GlobalState>,
    Path((target_type, target_id)): Path<(String, i64)>,
) -> Result<AppSuccess, AppError> {
    let target = Target::parse(&target_type, target_id)?;
    let summary = state.nexus.ratings.average(target).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Average fetched successfully", json!(summary)))
}
