use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::normalize::normalize_date;
use crate::server::AppState;
use crate::server::dto::{DocumentResponse, ListDocumentsParams, SetDueDateRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::require_field;
use crate::types::{Document, DocumentUpdate, FileBlob};

/// Uploads are read fully into memory before storing; documents in this
/// system are small review artifacts, not bulk archives.
const MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

/// Flat field set of the document form. Absent fields normalize to empty
/// strings / `None`, never to an error.
#[derive(Default)]
struct DocumentForm {
    dept_id: String,
    group_id: String,
    title: String,
    file_url: String,
    date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    file: Option<FileBlob>,
}

async fn parse_document_form(multipart: &mut Multipart) -> Result<DocumentForm, ApiError> {
    let mut form = DocumentForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        match field.name() {
            Some("deptId") => form.dept_id = read_text(field).await?.trim().to_uppercase(),
            Some("groupId") => form.group_id = read_text(field).await?.trim().to_string(),
            Some("title") => form.title = read_text(field).await?.trim().to_string(),
            Some("fileUrl") => form.file_url = read_text(field).await?.trim().to_string(),
            Some("date") => form.date = normalize_date(&read_text(field).await?),
            Some("dueDate") => form.due_date = normalize_date(&read_text(field).await?),
            Some("file") => {
                let name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("file.bin")
                    .to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                if data.len() > MAX_UPLOAD_SIZE {
                    return Err(ApiError::payload_too_large(format!(
                        "File size ({} bytes) exceeds maximum allowed size ({MAX_UPLOAD_SIZE} bytes)",
                        data.len()
                    )));
                }
                // An empty file part means no upload
                if !data.is_empty() {
                    form.file = Some(FileBlob {
                        mime,
                        name,
                        size: Some(data.len() as i64),
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read field: {e}")))
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDocumentsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let dept = params.dept.unwrap_or_default();
    require_field(&dept, "dept")?;

    let documents = state
        .store
        .list_documents(&dept, params.group.as_deref())
        .api_err("Failed to list documents")?;

    let now = Utc::now();
    let documents: Vec<DocumentResponse> = documents
        .into_iter()
        .map(|meta| DocumentResponse::new(meta, now))
        .collect();

    Ok(Json(ApiResponse::success(documents)))
}

pub async fn create_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = parse_document_form(&mut multipart).await?;
    require_field(&form.dept_id, "deptId")?;
    require_field(&form.title, "title")?;

    let store = state.store.as_ref();

    // Referenced reference-data rows are created on first use
    store
        .ensure_department(&form.dept_id)
        .api_err("Failed to ensure department")?;
    if !form.group_id.is_empty() {
        store
            .ensure_doc_group(&form.group_id)
            .api_err("Failed to ensure group")?;
    }

    let document = Document {
        id: Uuid::new_v4().to_string(),
        dept_id: form.dept_id,
        group_id: none_if_empty(form.group_id),
        title: form.title,
        file_url: none_if_empty(form.file_url),
        file: form.file,
        created_at: form.date.unwrap_or_else(Utc::now),
        due_date: form.due_date,
    };

    store
        .create_document(&document)
        .api_err("Failed to create document")?;

    let response = DocumentResponse::new(document.meta(), Utc::now());
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let meta = state
        .store
        .get_document_meta(&id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    Ok(Json(ApiResponse::success(DocumentResponse::new(
        meta,
        Utc::now(),
    ))))
}

pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = parse_document_form(&mut multipart).await?;
    require_field(&form.dept_id, "deptId")?;
    require_field(&form.title, "title")?;

    let store = state.store.as_ref();
    store
        .get_document_meta(&id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    let update = DocumentUpdate {
        id: id.clone(),
        title: form.title,
        file_url: none_if_empty(form.file_url),
        created_at: form.date,
        due_date: form.due_date,
        file: form.file,
    };
    store
        .update_document(&update)
        .api_err("Failed to update document")?;

    let meta = store
        .get_document_meta(&id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    Ok(Json(ApiResponse::success(DocumentResponse::new(
        meta,
        Utc::now(),
    ))))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Removes the document's sheet and comments in the same operation
    let deleted = state
        .store
        .delete_document(&id)
        .api_err("Failed to delete document")?;

    if !deleted {
        return Err(ApiError::not_found("Document not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_due_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetDueDateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.as_ref();
    store
        .get_document_meta(&id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    // Malformed input clears the due date rather than erroring
    let due_date = req.due_date.as_deref().and_then(normalize_date);
    store
        .set_document_due_date(&id, due_date)
        .api_err("Failed to set due date")?;

    let meta = store
        .get_document_meta(&id)
        .api_err("Failed to get document")?
        .or_not_found("Document not found")?;

    Ok(Json(ApiResponse::success(DocumentResponse::new(
        meta,
        Utc::now(),
    ))))
}
