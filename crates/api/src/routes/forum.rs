use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{
    AuthenticatedUser, CreateCategory, CreateCategoryRequest, CreateReply, CreateReplyRequest,
    CreateThread, CreateThreadRequest, ThreadFlagsRequest,
};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn forum_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/forum/categories",
            get(list_categories)
            .merge(
                post(create_category)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
        .route("/api/forum/categories/{id}/threads",
            get(list_threads)
        )
        .route("/api/forum/threads",
            post(create_thread)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
        .route("/api/forum/threads/{id}",
            get(get_thread)
            .merge(
                patch(update_thread)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
        .route("/api/forum/threads/{id}/replies",
            get(list_replies)
            .merge(
                post(create_reply)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
}

async fn list_categories(
    State(state): State<GlobalState>,
) -> Result<AppSuccess, AppError> {
    let categories = state.nexus.forum.categories().await?;
    Ok(AppSuccess::new(StatusCode::OK, "Categories fetched successfully", json!(categories)))
}

async fn create_category(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<AppSuccess, AppError> {
    let category = CreateCategory::try_from(payload)?;
    let category = state.nexus.forum.create_category(&caller, &category).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Category created successfully", json!(category)))
}

async fn list_threads(
    State(state): State<GlobalState>,
    Path(category_id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let threads = state.nexus.forum.threads(category_id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Threads fetched successfully", json!(threads)))
}

async fn create_thread(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateThreadRequest>,
) -> Result<AppSuccess, AppError> {
    let thread = CreateThread::try_from(payload)?;
    let thread = state.nexus.forum.create_thread(caller.id, &thread).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Thread created successfully", json!(thread)))
}

async fn get_thread(
    State(state): State<GlobalState>,
    Path(id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let thread = state.nexus.forum.thread(id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Thread fetched successfully", json!(thread)))
}

async fn update_thread(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ThreadFlagsRequest>,
) -> Result<AppSuccess, AppError> {
    let thread = state.nexus.forum.set_flags(&caller, id, &payload).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Thread updated successfully", json!(thread)))
}

async fn list_replies(
    State(state): State<GlobalState>,
    Path(thread_id): Path<i64>,
) -> Result<AppSuccess, AppError> {
    let replies = state.nexus.forum.replies(thread_id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Replies fetched successfully", json!(replies)))
}

async fn create_reply(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(thread_id): Path<i64>,
    Json(payload): Json<CreateReplyRequest>,
) -> Result<AppSuccess, AppError> {
    let reply = CreateReply::try_from(payload)?;
    let reply = state.nexus.forum.reply(thread_id, caller.id, &reply).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Reply created successfully", json!(reply)))
}
