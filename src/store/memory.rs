use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::Store;
use crate::error::{Error, Result};
use crate::types::*;

/// In-memory store backend. Same contract as [`super::SqliteStore`], no
/// durability; state lives for the lifetime of the process. Selected with
/// `serve --ephemeral`.
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    departments: BTreeMap<String, Department>,
    doc_groups: BTreeMap<String, DocGroup>,
    documents: HashMap<String, Document>,
    sheets: HashMap<String, Sheet>,
    comments: Vec<Comment>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn distinct_years_desc(years: impl Iterator<Item = Option<i32>>) -> Vec<i32> {
    let mut out: Vec<i32> = years.flatten().collect();
    out.sort_unstable_by(|a, b| b.cmp(a));
    out.dedup();
    out
}

impl Store for MemoryStore {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    // Department operations

    fn upsert_department(&self, id: &str, name: &str, year: Option<i32>) -> Result<()> {
        let mut inner = self.inner();
        match inner.departments.get_mut(id) {
            Some(existing) => {
                existing.name = name.to_string();
                existing.active = true;
                existing.year = year.or(existing.year);
            }
            None => {
                inner.departments.insert(
                    id.to_string(),
                    Department {
                        id: id.to_string(),
                        name: name.to_string(),
                        active: true,
                        year,
                    },
                );
            }
        }
        Ok(())
    }

    fn ensure_department(&self, id: &str) -> Result<()> {
        let mut inner = self.inner();
        inner.departments.entry(id.to_string()).or_insert(Department {
            id: id.to_string(),
            name: id.to_string(),
            active: true,
            year: None,
        });
        Ok(())
    }

    fn get_department(&self, id: &str) -> Result<Option<Department>> {
        Ok(self.inner().departments.get(id).cloned())
    }

    fn list_departments(&self, year: Option<i32>) -> Result<Vec<Department>> {
        let inner = self.inner();
        let mut rows: Vec<Department> = inner
            .departments
            .values()
            .filter(|d| d.active && (year.is_none() || d.year == year))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn list_department_years(&self) -> Result<Vec<i32>> {
        let inner = self.inner();
        Ok(distinct_years_desc(
            inner
                .departments
                .values()
                .filter(|d| d.active)
                .map(|d| d.year),
        ))
    }

    fn update_department(&self, dept: &Department) -> Result<()> {
        let mut inner = self.inner();
        let existing = inner.departments.get_mut(&dept.id).ok_or(Error::NotFound)?;
        *existing = dept.clone();
        Ok(())
    }

    fn deactivate_department(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner();
        match inner.departments.get_mut(id) {
            Some(dept) => {
                dept.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Doc group operations

    fn upsert_doc_group(&self, id: &str, name: &str, year: Option<i32>) -> Result<()> {
        let mut inner = self.inner();
        match inner.doc_groups.get_mut(id) {
            Some(existing) => {
                existing.name = name.to_string();
                existing.active = true;
                existing.year = year.or(existing.year);
            }
            None => {
                inner.doc_groups.insert(
                    id.to_string(),
                    DocGroup {
                        id: id.to_string(),
                        name: name.to_string(),
                        active: true,
                        year,
                    },
                );
            }
        }
        Ok(())
    }

    fn ensure_doc_group(&self, id: &str) -> Result<()> {
        let mut inner = self.inner();
        inner.doc_groups.entry(id.to_string()).or_insert(DocGroup {
            id: id.to_string(),
            name: id.to_string(),
            active: true,
            year: None,
        });
        Ok(())
    }

    fn get_doc_group(&self, id: &str) -> Result<Option<DocGroup>> {
        Ok(self.inner().doc_groups.get(id).cloned())
    }

    fn list_doc_groups(&self, year: Option<i32>) -> Result<Vec<DocGroup>> {
        let inner = self.inner();
        let mut rows: Vec<DocGroup> = inner
            .doc_groups
            .values()
            .filter(|g| g.active && (year.is_none() || g.year == year))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn list_doc_group_years(&self) -> Result<Vec<i32>> {
        let inner = self.inner();
        Ok(distinct_years_desc(
            inner
                .doc_groups
                .values()
                .filter(|g| g.active)
                .map(|g| g.year),
        ))
    }

    fn update_doc_group(&self, group: &DocGroup) -> Result<()> {
        let mut inner = self.inner();
        let existing = inner.doc_groups.get_mut(&group.id).ok_or(Error::NotFound)?;
        *existing = group.clone();
        Ok(())
    }

    fn deactivate_doc_group(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner();
        match inner.doc_groups.get_mut(id) {
            Some(group) => {
                group.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Document operations

    fn create_document(&self, doc: &Document) -> Result<()> {
        self.inner().documents.insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    fn get_document_meta(&self, id: &str) -> Result<Option<DocumentMeta>> {
        Ok(self.inner().documents.get(id).map(Document::meta))
    }

    fn list_documents(&self, dept_id: &str, group_id: Option<&str>) -> Result<Vec<DocumentMeta>> {
        let inner = self.inner();
        let mut metas: Vec<DocumentMeta> = inner
            .documents
            .values()
            .filter(|d| {
                d.dept_id == dept_id
                    && (group_id.is_none() || d.group_id.as_deref() == group_id)
            })
            .map(Document::meta)
            .collect();
        metas.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(metas)
    }

    fn update_document(&self, update: &DocumentUpdate) -> Result<()> {
        let mut inner = self.inner();
        let doc = inner.documents.get_mut(&update.id).ok_or(Error::NotFound)?;

        doc.title = update.title.clone();
        doc.file_url = update.file_url.clone();
        if let Some(created_at) = update.created_at {
            doc.created_at = created_at;
        }
        doc.due_date = update.due_date;
        if let Some(file) = &update.file {
            doc.file = Some(file.clone());
        }
        Ok(())
    }

    fn set_document_due_date(&self, id: &str, due_date: Option<DateTime<Utc>>) -> Result<()> {
        let mut inner = self.inner();
        let doc = inner.documents.get_mut(id).ok_or(Error::NotFound)?;
        doc.due_date = due_date;
        Ok(())
    }

    fn delete_document(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner();
        let removed = inner.documents.remove(id).is_some();
        if removed {
            inner.sheets.remove(id);
            inner.comments.retain(|c| c.document_id != id);
        }
        Ok(removed)
    }

    fn get_document_file(&self, id: &str) -> Result<Option<FileBlob>> {
        Ok(self
            .inner()
            .documents
            .get(id)
            .and_then(|d| d.file.clone()))
    }

    // Sheet operations

    fn put_sheet(&self, document_id: &str, sheet: &Sheet) -> Result<()> {
        self.inner()
            .sheets
            .insert(document_id.to_string(), sheet.clone());
        Ok(())
    }

    fn get_sheet(&self, document_id: &str) -> Result<Option<Sheet>> {
        Ok(self.inner().sheets.get(document_id).cloned())
    }

    // Comment operations

    fn create_comment(&self, comment: &Comment) -> Result<()> {
        self.inner().comments.push(comment.clone());
        Ok(())
    }

    fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>> {
        let inner = self.inner();
        let mut comments: Vec<Comment> = inner
            .comments
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();

        comments.sort_by(|a, b| {
            let a_open = a.status == CommentStatus::Open;
            let b_open = b.status == CommentStatus::Open;
            match (a_open, b_open) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                _ => b.created_at.cmp(&a.created_at),
            }
        });
        Ok(comments)
    }

    fn toggle_comment(&self, id: &str) -> Result<Option<CommentStatus>> {
        let mut inner = self.inner();
        match inner.comments.iter_mut().find(|c| c.id == id) {
            Some(comment) => {
                comment.status = comment.status.toggled();
                Ok(Some(comment.status))
            }
            None => Ok(None),
        }
    }
}
