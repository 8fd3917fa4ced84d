// Error types for the state manager and their HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Reasons a booking request is rejected; the state is left untouched in every case
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("Sign in to book a parking spot")]
    NotSignedIn,
    #[error("Select a parking lot first")]
    NoLotSelected,
    #[error("Duration must be between 1 and 24 hours")]
    InvalidDuration,
    #[error("Spot {0} does not belong to the selected lot")]
    SpotNotFound(String),
    #[error("Spot {0} is not available")]
    SpotUnavailable(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Parking data source unavailable: {0}")]
    SourceUnavailable(String),
}

// Application error type returned by handlers
#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl From<BookingError> for AppError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::NotSignedIn => AppError::Unauthorized(error.to_string()),
            _ => AppError::BadRequest(error.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        AppError::ServiceUnavailable(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Unauthorized(message) => {
                tracing::warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, message)
            }
            AppError::Forbidden(message) => {
                tracing::warn!("Forbidden: {}", message);
                (StatusCode::FORBIDDEN, message)
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::ServiceUnavailable(message) => {
                tracing::error!("Service unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, message)
            }
        };

        let body = Json(json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}
