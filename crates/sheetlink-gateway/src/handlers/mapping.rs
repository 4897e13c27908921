use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sheetlink_core::UrlMapping;
use sheetlink_mapping::CreateMapping;

/// `POST /mapping`: appends a mapping and echoes it with `201 Created`.
///
/// An empty body counts as `{}`.
pub async fn create_mapping_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<UrlMapping>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateMapping::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidBody(e.to_string()))?
    };

    let mapping = state.mappings().create(request).await?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

/// `GET /mapping`: lists every stored mapping in insertion order.
pub async fn list_mappings_handler(State(state): State<AppState>) -> Result<Json<Vec<UrlMapping>>> {
    let mappings = state.mappings().list().await?;
    Ok(Json(mappings))
}
