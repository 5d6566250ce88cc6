use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use nexus_runtime::NexusError;

pub type AppSuccess = GenericResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    pub status: u16,
    pub message: String,
    pub data: serde_json::Value,
}

impl GenericResponse {
    pub fn new(status: StatusCode, message: &str, data: serde_json::Value) -> Self {
        Self {
            status: status.as_u16(),
            message: message.to_string(),
            data,
        }
    }
}

impl IntoResponse for GenericResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json::from(self)).into_response()
    }
}

#[derive(Debug)]
pub struct AppError(pub StatusCode, pub anyhow::Error);

impl AppError {
    pub fn new(status: StatusCode, err: anyhow::Error) -> Self {
        Self(status, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            tracing::error!("CODE: {}, MESSAGE: {:#}", self.0.as_u16(), self.1);
        } else {
            tracing::debug!("CODE: {}, MESSAGE: {}", self.0.as_u16(), self.1);
        }
        GenericResponse::new(self.0, &self.1.to_string(), json!({})).into_response()
    }
}

pub fn status_for(err: &NexusError) -> StatusCode {
    match err {
        NexusError::NotFound(_) => StatusCode::NOT_FOUND,
        NexusError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        NexusError::Conflict(_) => StatusCode::CONFLICT,
        NexusError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        NexusError::Forbidden(_) => StatusCode::FORBIDDEN,
        NexusError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Lets handlers use `?` on anything convertible to `anyhow::Error`. Domain errors keep their
// status; anything else is treated as a bad request.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        let status = err
            .downcast_ref::<NexusError>()
            .map(status_for)
            .unwrap_or(StatusCode::BAD_REQUEST);
        Self(status, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_keep_their_status() {
        let err: AppError = NexusError::conflict("username taken").into();
        assert_eq!(err.0, StatusCode::CONFLICT);

        let err: AppError = NexusError::Storage(anyhow::anyhow!("pool closed")).into();
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);

        let err: AppError = anyhow::anyhow!("[/api/posts] bad input").into();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
