//! Mapping of engine errors onto HTTP responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gitshelf_core::ShelfError;
use serde::Serialize;

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the engine
    Shelf(ShelfError),
    /// A request body the handler cannot use
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Shelf(err) => match err {
                ShelfError::MalformedPath { .. }
                | ShelfError::PathEscape { .. }
                | ShelfError::Validation { .. }
                | ShelfError::NotInitialized { .. } => StatusCode::BAD_REQUEST,
                ShelfError::NotFound { .. } | ShelfError::ContentUnavailable { .. } => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<ShelfError> for ApiError {
    fn from(err: ShelfError) -> Self {
        ApiError::Shelf(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) => ErrorBody {
                error: message,
                error_id: None,
            },
            ApiError::Shelf(err) => {
                err.log();
                // Internal faults are not described to the client
                let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    "Internal server error".to_string()
                } else {
                    err.to_string()
                };
                ErrorBody {
                    error,
                    error_id: err.context().map(|ctx| ctx.error_id.clone()),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
