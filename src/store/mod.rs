mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Both backends share the same semantics: soft delete for reference data,
/// cascade from a document to its sheet and comments, last-writer-wins on
/// racing updates.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Department operations
    fn upsert_department(&self, id: &str, name: &str, year: Option<i32>) -> Result<()>;
    fn ensure_department(&self, id: &str) -> Result<()>;
    fn get_department(&self, id: &str) -> Result<Option<Department>>;
    fn list_departments(&self, year: Option<i32>) -> Result<Vec<Department>>;
    fn list_department_years(&self) -> Result<Vec<i32>>;
    fn update_department(&self, dept: &Department) -> Result<()>;
    fn deactivate_department(&self, id: &str) -> Result<bool>;

    // Doc group operations
    fn upsert_doc_group(&self, id: &str, name: &str, year: Option<i32>) -> Result<()>;
    fn ensure_doc_group(&self, id: &str) -> Result<()>;
    fn get_doc_group(&self, id: &str) -> Result<Option<DocGroup>>;
    fn list_doc_groups(&self, year: Option<i32>) -> Result<Vec<DocGroup>>;
    fn list_doc_group_years(&self) -> Result<Vec<i32>>;
    fn update_doc_group(&self, group: &DocGroup) -> Result<()>;
    fn deactivate_doc_group(&self, id: &str) -> Result<bool>;

    // Document operations
    fn create_document(&self, doc: &Document) -> Result<()>;
    fn get_document_meta(&self, id: &str) -> Result<Option<DocumentMeta>>;
    fn list_documents(&self, dept_id: &str, group_id: Option<&str>) -> Result<Vec<DocumentMeta>>;
    fn update_document(&self, update: &DocumentUpdate) -> Result<()>;
    fn set_document_due_date(&self, id: &str, due_date: Option<DateTime<Utc>>) -> Result<()>;
    /// Removes the document together with its sheet and comments, as one
    /// atomic operation.
    fn delete_document(&self, id: &str) -> Result<bool>;
    fn get_document_file(&self, id: &str) -> Result<Option<FileBlob>>;

    // Sheet operations (1:1 with documents, import replaces)
    fn put_sheet(&self, document_id: &str, sheet: &Sheet) -> Result<()>;
    fn get_sheet(&self, document_id: &str) -> Result<Option<Sheet>>;

    // Comment operations
    fn create_comment(&self, comment: &Comment) -> Result<()>;
    fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>>;
    /// Flips Open<->Resolved. Returns the new status, or `None` for an
    /// unknown id.
    fn toggle_comment(&self, id: &str) -> Result<Option<CommentStatus>>;
}
