use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::server::AppState;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};

/// GET /documents/{id}/file - Stream the stored upload back to the client.
///
/// 404 unless the document exists with a non-null blob. Pure read, no side
/// effects.
pub async fn get_document_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let blob = state
        .store
        .get_document_file(&id)
        .api_err("Failed to load document file")?
        .or_not_found("File not found")?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&blob.mime)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );

    let disposition = format!("inline; filename=\"{}\"", urlencoding::encode(&blob.name));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).unwrap_or(HeaderValue::from_static("inline")),
    );

    if let Some(size) = blob.size {
        if let Ok(value) = HeaderValue::from_str(&size.to_string()) {
            headers.insert(header::CONTENT_LENGTH, value);
        }
    }

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, max-age=0, must-revalidate"),
    );

    Ok((StatusCode::OK, headers, blob.data).into_response())
}
