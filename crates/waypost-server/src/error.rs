//! HTTP error envelope
//!
//! Every failure leaves the service as `{"message": "..."}` with a status
//! chosen by error kind.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, warn};

use waypost_core::{StoreError, ValidationError};

/// `{"message": ...}` body used for errors and confirmations
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body was not usable JSON for the endpoint
    #[error("{message}")]
    MalformedPayload { status: StatusCode, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking store task panicked or was cancelled
    #[error("Store task failed: {0}")]
    Task(#[from] JoinError),
}

impl From<JsonRejection> for ApiError {
    /// Unusable JSON is a 400, except for bodies over the size limit
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::BytesRejection(_) => rejection.status(),
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError::MalformedPayload {
            status,
            message: rejection.body_text(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Store(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload { status, .. } => *status,
            ApiError::Store(err) if !err.is_client_error() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!("Request failed: {self}");
            "Internal server error".to_string()
        } else {
            warn!(status = status.as_u16(), "Rejected request: {self}");
            self.to_string()
        };

        (status, Json(MessageBody::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypost_core::{AddressId, Field, StorageError};

    fn corrupt_row(details: &str) -> StorageError {
        StorageError::CorruptRow {
            table: "addresses",
            details: details.to_string(),
        }
    }

    #[test]
    fn test_status_mapping() {
        let validation: ApiError = ValidationError::MissingFields(vec![Field::Label]).into();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.to_string(), "Label is required");

        let not_found: ApiError = StoreError::NotFound(AddressId::new(1)).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid: ApiError = ValidationError::InvalidId("x".into()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let storage: ApiError = StoreError::Storage(corrupt_row("boom")).into();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let storage: ApiError = StoreError::Storage(corrupt_row("secret path /var/lib/x")).into();

        let response = storage.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
    }
}
