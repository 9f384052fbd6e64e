//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokenlease_core::BrokerError;

use crate::storage::StorageError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    /// HTTP status and stable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Broker(err) => {
                let status = match err {
                    BrokerError::InvalidRequest(_) | BrokerError::InvalidTtl(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    BrokerError::MisconfiguredBackend(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    BrokerError::ExchangeFailed(_) => StatusCode::BAD_GATEWAY,
                    BrokerError::ConfigUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.code())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => ApiError::Broker(BrokerError::ConfigUnavailable(msg)),
        }
    }
}
