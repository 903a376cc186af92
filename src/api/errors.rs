//! HTTP error mapping for API handlers.

use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub code: &'static str,
}

#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "service_not_found"),
            Error::ContainerNotFound(_) => (StatusCode::NOT_FOUND, "container_not_found"),
            Error::RuntimeUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "runtime_unavailable"),
            Error::RuntimeApi(_) => (StatusCode::INTERNAL_SERVER_ERROR, "runtime_error"),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("Request failed: {:?}", self.0);
        }
        let body = ErrorBody {
            detail: self.0.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
