use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Organizational unit that owns documents. Never hard-deleted; `active`
/// is flipped off instead so historical documents keep a valid reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Category/year bucket documents can optionally belong to. Same lifecycle
/// as [`Department`], independent id namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocGroup {
    pub id: String,
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// An uploaded file stored inline with its document row.
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub mime: String,
    pub name: String,
    pub size: Option<i64>,
    pub data: Vec<u8>,
}

/// Full document row, including the optional inline blob. Exactly one of
/// `file_url` and `file` is authoritative for the "open file" action.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub dept_id: String,
    pub group_id: Option<String>,
    pub title: String,
    pub file_url: Option<String>,
    pub file: Option<FileBlob>,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Document {
    /// Blob-free projection of this row.
    #[must_use]
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id.clone(),
            dept_id: self.dept_id.clone(),
            group_id: self.group_id.clone(),
            title: self.title.clone(),
            file_url: self.file_url.clone(),
            file_name: self.file.as_ref().map(|f| f.name.clone()),
            file_size: self.file.as_ref().and_then(|f| f.size),
            has_file: self.file.is_some(),
            created_at: self.created_at,
            due_date: self.due_date,
        }
    }
}

/// Document projection used by list and meta reads. Carries file metadata
/// and the derived `has_file` flag, never the blob bytes.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub id: String,
    pub dept_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    pub has_file: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl DocumentMeta {
    /// A document is overdue iff it has a due date strictly before `now`.
    /// Recomputed on every read, never stored.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }

    /// Signed whole-day delta until the due date. Negative once overdue.
    #[must_use]
    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.due_date.map(|due| (due - now).num_days())
    }
}

/// Field set for an in-place document update. `created_at: None` keeps the
/// existing timestamp; `file: None` keeps the existing blob; `due_date` is
/// stored as given (a `None` clears it).
#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub id: String,
    pub title: String,
    pub file_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub file: Option<FileBlob>,
}

/// Tabular data imported from CSV, keyed 1:1 by document id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentStatus {
    Open,
    Resolved,
}

impl CommentStatus {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Resolved,
            Self::Resolved => Self::Open,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Resolved => "Resolved",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(Self::Open),
            "Resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// Reviewer annotation anchored to a (row, column) cell of a document's
/// sheet. Comments toggle between open and resolved; they are never deleted
/// except when the owning document is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub document_id: String,
    pub row_index: i64,
    pub col_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn meta_with_due(due: Option<DateTime<Utc>>) -> DocumentMeta {
        DocumentMeta {
            id: "doc-1".to_string(),
            dept_id: "QA".to_string(),
            group_id: None,
            title: "Audit checklist".to_string(),
            file_url: None,
            file_name: None,
            file_size: None,
            has_file: false,
            created_at: Utc::now(),
            due_date: due,
        }
    }

    #[test]
    fn test_overdue_predicate() {
        let now = Utc::now();
        assert!(meta_with_due(Some(now - Duration::days(1))).is_overdue(now));
        assert!(!meta_with_due(Some(now + Duration::days(1))).is_overdue(now));
        assert!(!meta_with_due(None).is_overdue(now));
    }

    #[test]
    fn test_days_left_sign() {
        let now = Utc::now();
        let ahead = meta_with_due(Some(now + Duration::days(3)));
        assert_eq!(ahead.days_left(now), Some(3));

        let behind = meta_with_due(Some(now - Duration::days(2)));
        assert_eq!(behind.days_left(now), Some(-2));

        assert_eq!(meta_with_due(None).days_left(now), None);
    }

    #[test]
    fn test_toggle_is_involutive() {
        for status in [CommentStatus::Open, CommentStatus::Resolved] {
            assert_eq!(status.toggled().toggled(), status);
            assert_ne!(status.toggled(), status);
        }
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(CommentStatus::parse("Open"), Some(CommentStatus::Open));
        assert_eq!(
            CommentStatus::parse("Resolved"),
            Some(CommentStatus::Resolved)
        );
        assert_eq!(CommentStatus::parse("closed"), None);
        assert_eq!(
            CommentStatus::parse(CommentStatus::Open.as_str()),
            Some(CommentStatus::Open)
        );
    }
}
