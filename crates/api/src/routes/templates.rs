use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;

use nexus_runtime::{AuthenticatedUser, CreateTemplate, CreateTemplateRequest};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn template_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/templates",
            get(list_templates)
            .merge(
                post(create_template)
                .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
            )
        )
}

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub category: Option<String>,
}

async fn list_templates(
    State(state): State<GlobalState>,
    Query(query): Query<TemplateQuery>,
) -> Result<AppSuccess, AppError> {
    let templates = state.nexus.templates.list(query.category.as_deref()).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Templates fetched successfully", json!(templates)))
}

async fn create_template(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<AppSuccess, AppError> {
    let template = CreateTemplate::try_from(payload)?;
    let template = state.nexus.templates.create(caller.id, &template).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Template created successfully", json!(template)))
}
