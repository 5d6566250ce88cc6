use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, CreateProject, CreateProjectRequest, JoinProjectRequest};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn project_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/projects",
            get(list_projects)
            .merge(
                post(create_project)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
        .route("/api/projects/{id}",
            get(get_project)
        )
        .route("/api/projects/{id}/members",
            get(list_members)
            .merge(
                post(join_project)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
}

async fn list_projects(
    State(state): State<GlobalState>,
) -> Result<AppSuccess, AppError> {
    let projects = state.nexus.projects.list().await?;
    Ok(AppSuccess::new(StatusCode::OK, "Projects fetched successfully", json!(projects)))
}

async fn get_project(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let project = state.nexus.projects.get(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Project fetched successfully", json!(project)))
}

async fn create_project(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<AppSuccess, AppError> {
    let project = CreateProject::try_from(payload)?;
    let project = state.nexus.projects.create(caller.id, &project).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Project created successfully", json!(project)))
}

async fn list_members(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let members = state.nexus.projects.members(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Members fetched successfully", json!(members)))
}

async fn join_project(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<JoinProjectRequest>,
) -> Result<AppSuccess, AppError> {
    let member = state.nexus.projects.join(id, caller.id, &payload).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Joined project successfully", json!(member)))
}
