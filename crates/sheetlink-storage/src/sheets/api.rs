//! Wire types for the Sheets v4 `values` endpoints and the mapping of
//! transport failures onto [`StorageError`].

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetlink_core::{Row, StorageError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppendBody<'a> {
    pub range: String,
    pub major_dimension: &'static str,
    pub values: [&'a Row; 1],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppendResponse {
    #[serde(default)]
    pub updates: Option<AppendUpdates>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppendUpdates {
    #[serde(default)]
    pub updated_range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchGetResponse {
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ValueRange {
    #[serde(default)]
    pub values: Vec<Option<Vec<Value>>>,
}

impl ValueRange {
    pub fn into_rows(self) -> Vec<Option<Row>> {
        self.values
            .into_iter()
            .map(|row| row.map(|cells| cells.into_iter().map(cell_text).collect()))
            .collect()
    }
}

/// Renders a cell as the text a user would see in the sheet.
fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Api { message: String },
    OAuth(String),
}

/// Extracts the human-readable message from an error body, falling back to
/// the raw body.
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorDetail::Api { message },
        }) => message,
        Ok(ErrorEnvelope {
            error: ErrorDetail::OAuth(code),
        }) => code,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    };
    format!("{status}: {detail}")
}

/// Maps a non-success status from the Sheets API.
pub(crate) fn status_error(status: StatusCode, body: &str) -> StorageError {
    let message = error_message(status, body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized(message),
        StatusCode::NOT_FOUND => StorageError::NotFound(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StorageError::Timeout(message),
        StatusCode::TOO_MANY_REQUESTS => StorageError::Unavailable(message),
        s if s.is_server_error() => StorageError::Unavailable(message),
        _ => StorageError::Request(message),
    }
}

/// Maps a non-success status from the OAuth token endpoint.
///
/// Any client error there means the credential itself was refused.
pub(crate) fn token_status_error(status: StatusCode, body: &str) -> StorageError {
    if status.is_client_error() {
        StorageError::Unauthorized(error_message(status, body))
    } else {
        status_error(status, body)
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> StorageError {
    let message = err.to_string();

    if err.is_timeout() {
        StorageError::Timeout(message)
    } else if err.is_connect() {
        StorageError::Unavailable(message)
    } else if err.is_decode() {
        StorageError::InvalidData(message)
    } else {
        StorageError::Request(message)
    }
}
