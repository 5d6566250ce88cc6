use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;

use nexus_runtime::{
    AuthenticatedUser, CreateReport, CreateReportRequest, NexusError, ReportStatus, ReviewReport,
    ReviewReportRequest,
};

use crate::middleware::authenticate;
use crate::response::{AppError, AppSuccess};
use crate::GlobalState;

pub fn report_routes(state: &GlobalState) -> Router<GlobalState> {
    Router::new()
        .route("/api/reports",
            get(list_reports)
            .post(create_report)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
        .route("/api/reports/{id}",
            patch(review_report)
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        )
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub status: Option<String>,
}

async fn create_report(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateReportRequest>,
) -> Result<AppSuccess, AppError> {
    let report = CreateReport::try_from(payload)?;
    let report = state.nexus.moderation.report(caller.id, &report).await?;
    Ok(AppSuccess::new(StatusCode::CREATED, "Report filed successfully", json!(report)))
}

async fn list_reports(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(query): Query<ReportQuery>,
) -> Result<AppSuccess, AppError> {
    let status = query
        .status
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .to_lowercase()
                .parse::<ReportStatus>()
                .map_err(|_| NexusError::invalid(format!("unknown report status `{s}`")))
        })
        .transpose()?;
    let reports = state.nexus.moderation.list(&caller, status).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Reports fetched successfully", json!(reports)))
}

async fn review_report(
    State(state): State<GlobalState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ReviewReportRequest>,
) -> Result<AppSuccess, AppError> {
    let review = ReviewReport::try_from(payload)?;
    let report = state.nexus.moderation.review(&caller, id, &review).await?;
    Ok(AppSuccess::new(StatusCode::OK, "Report reviewed successfully", json!(report)))
}
