use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::server::AppState;
use crate::server::dto::{CreateCommentRequest, ToggleCommentResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{require_field, validate_cell_index};
use crate::types::{Comment, CommentStatus};

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    // An unknown document simply has no comments
    let comments = state
        .store
        .list_comments(&document_id)
        .api_err("Failed to list comments")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(comments)))
}

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> impl IntoResponse {
    validate_cell_index(req.row, "row")?;
    validate_cell_index(req.col, "col")?;
    let text = req.comment.trim().to_string();
    require_field(&text, "comment")?;

    let store = state.store.as_ref();
    store
        .get_document_meta(&document_id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        document_id,
        row_index: req.row,
        col_index: req.col,
        field: req.field.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()),
        comment: text,
        reviewer: req
            .reviewer
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
        status: CommentStatus::Open,
        created_at: Utc::now(),
    };

    store
        .create_comment(&comment)
        .api_err("Failed to create comment")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

pub async fn toggle_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let status = state
        .store
        .toggle_comment(&id)
        .api_err("Failed to toggle comment")?
        .or_not_found("Comment not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(ToggleCommentResponse {
        id,
        status,
    })))
}
