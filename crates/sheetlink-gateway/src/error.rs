use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sheetlink_core::StorageError;
use sheetlink_mapping::MappingError;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("request body is not valid JSON: {0}")]
    InvalidBody(String),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::Mapping(MappingError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Mapping(MappingError::Storage(source)) => match source {
                StorageError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StorageError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                StorageError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
                StorageError::Unauthorized(_)
                | StorageError::NotFound(_)
                | StorageError::InvalidData(_)
                | StorageError::Request(_)
                | StorageError::Operation(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
