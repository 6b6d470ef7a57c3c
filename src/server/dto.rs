use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CommentStatus, DocumentMeta};

#[derive(Debug, Deserialize)]
pub struct CreateRefRequest {
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRefRequest {
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListRefParams {
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListDocumentsParams {
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetDueDateRequest {
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub row: i64,
    pub col: i64,
    #[serde(default)]
    pub field: Option<String>,
    pub comment: String,
    #[serde(default)]
    pub reviewer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleCommentResponse {
    pub id: String,
    pub status: CommentStatus,
}

/// Document projection plus the due-date fields derived at read time.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub overdue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
}

impl DocumentResponse {
    #[must_use]
    pub fn new(meta: DocumentMeta, now: DateTime<Utc>) -> Self {
        let overdue = meta.is_overdue(now);
        let days_left = meta.days_left(now);
        Self {
            meta,
            overdue,
            days_left,
        }
    }
}
