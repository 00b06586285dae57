// API error mapping for HTTP handlers
use crate::application::probe_repository::BackendError;
use crate::domain::range_selector::RangeError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(backend) = err.downcast_ref::<BackendError>() {
            return match backend {
                BackendError::NotFound(detail) => ApiError::NotFound(detail.clone()),
                BackendError::Unauthorized(detail) => ApiError::Unauthorized(detail.clone()),
                BackendError::Rejected(detail) => ApiError::BadRequest(detail.clone()),
                BackendError::Upstream { .. } => ApiError::Upstream(backend.to_string()),
            };
        }
        if let Some(range) = err.downcast_ref::<RangeError>() {
            return ApiError::BadRequest(range.to_string());
        }

        if err.downcast_ref::<reqwest::Error>().is_some() {
            tracing::error!("Backend request failed: {:#}", err);
            return ApiError::Upstream(format!("{:#}", err));
        }

        tracing::error!("Request failed: {:#}", err);
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Internal(status.canonical_reason().unwrap_or("internal error").to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Responding {}: {}", status, self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
