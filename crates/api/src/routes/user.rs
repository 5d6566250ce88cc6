use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, AwardBadgeRequest, SetRoleRequest, UserRole};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn user_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/users/{id}",
            get(get_user)
        )
        .route("/api/users/{id}/role",
            patch(set_role)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
        .route("/api/users/{id}/level",
            get(get_level)
        )
        .route("/api/users/{id}/badges",
            get(list_badges)
            .merge(
                post(award_badge)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
        .route("/api/users/{id}/projects",
            get(list_projects)
        )
        .route("/api/users/{id}/favorites",
            get(list_favorites)
        )
}

async fn get_user(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let user = state.nexus.accounts.get_user(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "User fetched successfully", json!(user)))
}

async fn set_role(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<AppSuccess, AppError> {
    let role = UserRole::try_from(payload)?;
    let user = state.nexus.accounts.set_role(&caller, id, role).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Role updated successfully", json!(user)))
}

async fn get_level(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let level = state.nexus.accounts.level_info(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Level fetched successfully", json!(level)))
}

async fn list_badges(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let badges = state.nexus.badges.list_for_user(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Badges fetched successfully", json!(badges)))
}

async fn award_badge(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AwardBadgeRequest>,
) -> Result<AppSuccess, AppError> {
    caller.require_admin()?;
    let user_badge = state.nexus.badges.award(id, payload.badge_id()?).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Badge awarded successfully", json!(user_badge)))
}

async fn list_projects(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let projects = state.nexus.projects.list_for_user(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Projects fetched successfully", json!(projects)))
}

async fn list_favorites(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let favorites = state.nexus.favorites.list_for_user(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Favorites fetched successfully", json!(favorites)))
}
