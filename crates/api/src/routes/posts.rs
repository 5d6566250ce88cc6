use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, CreatePost, CreatePostRequest};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn post_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/posts",
            get(list_posts)
            .merge(
                post(create_post)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
        .route("/api/posts/{id}",
            get(get_post)
        )
}

async fn list_posts(
    State(state): State<GlobalState>,
) -> Result<AppSuccess, AppError> {
    let posts = state.nexus.feed.list().await?;
    Ok(AppSuccess::new(StatusCode::OK, "Posts fetched successfully", json!(posts)))
}

async fn get_post(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let post = state.nexus.feed.get(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Post fetched successfully", json!(post)))
}

async fn create_post(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<AppSuccess, AppError> {
    let post = CreatePost::try_from(payload)?;
    let post = state.nexus.feed.create(caller.id, &post).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Post created successfully", json!(post)))
}
