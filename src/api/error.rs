use crate::agent::DispatchError;
use crate::tools::RegistryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Message returned when the request has no usable `query`.
pub const MISSING_QUERY: &str = "Missing 'query' in request payload";

/// Error body: `{ "error": "<message>" }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn missing_query() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MISSING_QUERY)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status = match &err {
            DispatchError::Registry(
                RegistryError::UnknownTool(_) | RegistryError::SchemaViolation { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            DispatchError::Registry(RegistryError::DuplicateName(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DispatchError::Model(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}
