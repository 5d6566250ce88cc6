use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, Credentials, CredentialsRequest};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn auth_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/register",
            post(register)
        )
        .route("/api/login",
            post(login)
        )
        .route("/api/user",
            get(current_user)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
}

async fn register(
    State(state): State<GlobalState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<AppSuccess, AppError> {
    let credentials = Credentials::try_from(payload)?;
    let session = state.nexus.accounts.register(&credentials).await?;

    Ok(AppSuccess::new(StatusCode::CREATED, "Registered successfully", json!(session)))
}

async fn login(
    State(state): State<GlobalState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<AppSuccess, AppError> {
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    let session = state.nexus.accounts.login(&username, &password).await?;

    Ok(AppSuccess::new(StatusCode::OK, "Logged in successfully", json!(session)))
}

async fn current_user(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<AppSuccess, AppError> {
    let user = state.nexus.accounts.get_user(caller.id).await?;
    Ok(AppSuccess::new(StatusCode::OK, "User fetched successfully", json!(user)))
}
