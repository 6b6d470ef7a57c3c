use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::sheet::parse_csv;

pub async fn get_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sheet = state
        .store
        .get_sheet(&id)
        .api_err("Failed to get sheet")?
        .or_not_found("Sheet not found")?;

    Ok(Json(ApiResponse::success(sheet)))
}

/// PUT /documents/{id}/sheet - Import a CSV body, replacing any prior sheet
/// for this document.
pub async fn import_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();
    store
        .get_document_meta(&id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    let sheet = parse_csv(&body);
    if sheet.headers.is_empty() {
        return Err(ApiError::bad_request("CSV has no header row"));
    }

    store.put_sheet(&id, &sheet).api_err("Failed to store sheet")?;

    Ok(Json(ApiResponse::success(sheet)))
}
