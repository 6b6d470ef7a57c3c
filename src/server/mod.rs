mod comments;
mod departments;
mod documents;
pub mod dto;
mod files;
mod groups;
pub mod response;
mod router;
mod sheets;
pub mod validation;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

pub use router::{AppState, create_router};

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Departments (soft-deleted reference data)
        .route("/departments", get(departments::list_departments))
        .route("/departments", post(departments::create_department))
        .route("/departments/years", get(departments::list_department_years))
        .route("/departments/{id}", patch(departments::update_department))
        .route("/departments/{id}", delete(departments::delete_department))
        // Document groups (same lifecycle, independent namespace)
        .route("/groups", get(groups::list_doc_groups))
        .route("/groups", post(groups::create_doc_group))
        .route("/groups/years", get(groups::list_doc_group_years))
        .route("/groups/{id}", patch(groups::update_doc_group))
        .route("/groups/{id}", delete(groups::delete_doc_group))
        // Documents
        .route("/documents", get(documents::list_documents))
        .route("/documents", post(documents::create_document))
        .route("/documents/{id}", get(documents::get_document))
        .route("/documents/{id}", patch(documents::update_document))
        .route("/documents/{id}", delete(documents::delete_document))
        .route("/documents/{id}/due-date", put(documents::set_due_date))
        .route("/documents/{id}/file", get(files::get_document_file))
        // Imported sheet (1:1 with a document)
        .route("/documents/{id}/sheet", get(sheets::get_sheet))
        .route("/documents/{id}/sheet", put(sheets::import_sheet))
        // Per-cell comments
        .route("/documents/{id}/comments", get(comments::list_comments))
        .route("/documents/{id}/comments", post(comments::add_comment))
        .route("/comments/{id}/toggle", post(comments::toggle_comment))
}
