use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_status(s: &str) -> CommentStatus {
    CommentStatus::parse(s).unwrap_or_else(|| {
        tracing::error!("Invalid comment status in database: '{}'", s);
        CommentStatus::Open
    })
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn meta_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentMeta> {
    Ok(DocumentMeta {
        id: row.get(0)?,
        dept_id: row.get(1)?,
        group_id: row.get(2)?,
        title: row.get(3)?,
        file_url: row.get(4)?,
        file_name: row.get(5)?,
        file_size: row.get(6)?,
        has_file: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        due_date: row.get::<_, Option<String>>(9)?.map(|s| parse_datetime(&s)),
    })
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        document_id: row.get(1)?,
        row_index: row.get(2)?,
        col_index: row.get(3)?,
        field: row.get(4)?,
        comment: row.get(5)?,
        reviewer: row.get(6)?,
        status: parse_status(&row.get::<_, String>(7)?),
        created_at: parse_datetime(&row.get::<_, String>(8)?),
    })
}

const DOCUMENT_META_COLUMNS: &str = "id, dept_id, group_id, title, file_url, file_name, \
     file_size, file_data IS NOT NULL, created_at, due_date";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Department operations

    fn upsert_department(&self, id: &str, name: &str, year: Option<i32>) -> Result<()> {
        self.conn().execute(
            "INSERT INTO departments (id, name, active, year) VALUES (?1, ?2, 1, ?3)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                active = 1,
                year = COALESCE(excluded.year, departments.year)",
            params![id, name, year],
        )?;
        Ok(())
    }

    fn ensure_department(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO departments (id, name, active) VALUES (?1, ?1, 1)",
            params![id],
        )?;
        Ok(())
    }

    fn get_department(&self, id: &str) -> Result<Option<Department>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, active, year FROM departments WHERE id = ?1",
            params![id],
            |row| {
                Ok(Department {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get(2)?,
                    year: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_departments(&self, year: Option<i32>) -> Result<Vec<Department>> {
        let conn = self.conn();
        let map = |row: &rusqlite::Row<'_>| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
                active: row.get(2)?,
                year: row.get(3)?,
            })
        };

        let rows = match year {
            Some(year) => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, active, year FROM departments
                     WHERE active = 1 AND year = ?1 ORDER BY name",
                )?;
                let rows = stmt.query_map(params![year], map)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, active, year FROM departments
                     WHERE active = 1 ORDER BY name",
                )?;
                let rows = stmt.query_map([], map)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        rows.map_err(Error::from)
    }

    fn list_department_years(&self) -> Result<Vec<i32>> {
        let conn = self.conn();

        // Databases created before the year column was added
        if !table_has_column(&conn, "departments", "year")? {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT DISTINCT year FROM departments
             WHERE active = 1 AND year IS NOT NULL ORDER BY year DESC",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_department(&self, dept: &Department) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE departments SET name = ?1, year = ?2, active = ?3 WHERE id = ?4",
            params![dept.name, dept.year, dept.active, dept.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn deactivate_department(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("UPDATE departments SET active = 0 WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Doc group operations

    fn upsert_doc_group(&self, id: &str, name: &str, year: Option<i32>) -> Result<()> {
        self.conn().execute(
            "INSERT INTO doc_groups (id, name, active, year) VALUES (?1, ?2, 1, ?3)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                active = 1,
                year = COALESCE(excluded.year, doc_groups.year)",
            params![id, name, year],
        )?;
        Ok(())
    }

    fn ensure_doc_group(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO doc_groups (id, name, active) VALUES (?1, ?1, 1)",
            params![id],
        )?;
        Ok(())
    }

    fn get_doc_group(&self, id: &str) -> Result<Option<DocGroup>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, active, year FROM doc_groups WHERE id = ?1",
            params![id],
            |row| {
                Ok(DocGroup {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get(2)?,
                    year: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_doc_groups(&self, year: Option<i32>) -> Result<Vec<DocGroup>> {
        let conn = self.conn();
        let map = |row: &rusqlite::Row<'_>| {
            Ok(DocGroup {
                id: row.get(0)?,
                name: row.get(1)?,
                active: row.get(2)?,
                year: row.get(3)?,
            })
        };

        let rows = match year {
            Some(year) => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, active, year FROM doc_groups
                     WHERE active = 1 AND year = ?1 ORDER BY name",
                )?;
                let rows = stmt.query_map(params![year], map)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, active, year FROM doc_groups
                     WHERE active = 1 ORDER BY name",
                )?;
                let rows = stmt.query_map([], map)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        rows.map_err(Error::from)
    }

    fn list_doc_group_years(&self) -> Result<Vec<i32>> {
        let conn = self.conn();

        if !table_has_column(&conn, "doc_groups", "year")? {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT DISTINCT year FROM doc_groups
             WHERE active = 1 AND year IS NOT NULL ORDER BY year DESC",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_doc_group(&self, group: &DocGroup) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE doc_groups SET name = ?1, year = ?2, active = ?3 WHERE id = ?4",
            params![group.name, group.year, group.active, group.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn deactivate_doc_group(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("UPDATE doc_groups SET active = 0 WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Document operations

    fn create_document(&self, doc: &Document) -> Result<()> {
        self.conn().execute(
            "INSERT INTO documents (id, dept_id, group_id, title, file_url, file_mime,
                                    file_size, file_name, file_data, created_at, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                doc.id,
                doc.dept_id,
                doc.group_id,
                doc.title,
                doc.file_url,
                doc.file.as_ref().map(|f| f.mime.as_str()),
                doc.file.as_ref().and_then(|f| f.size),
                doc.file.as_ref().map(|f| f.name.as_str()),
                doc.file.as_ref().map(|f| f.data.as_slice()),
                format_datetime(&doc.created_at),
                doc.due_date.as_ref().map(format_datetime),
            ],
        )?;
        Ok(())
    }

    fn get_document_meta(&self, id: &str) -> Result<Option<DocumentMeta>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {DOCUMENT_META_COLUMNS} FROM documents WHERE id = ?1"),
            params![id],
            meta_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_documents(&self, dept_id: &str, group_id: Option<&str>) -> Result<Vec<DocumentMeta>> {
        let conn = self.conn();

        let rows = match group_id {
            Some(group_id) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {DOCUMENT_META_COLUMNS} FROM documents
                     WHERE dept_id = ?1 AND group_id = ?2 ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map(params![dept_id, group_id], meta_from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {DOCUMENT_META_COLUMNS} FROM documents
                     WHERE dept_id = ?1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map(params![dept_id], meta_from_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()
            }
        };

        rows.map_err(Error::from)
    }

    fn update_document(&self, update: &DocumentUpdate) -> Result<()> {
        let rows = match &update.file {
            Some(file) => self.conn().execute(
                "UPDATE documents SET
                    title = ?1,
                    file_url = ?2,
                    file_mime = ?3,
                    file_size = ?4,
                    file_name = ?5,
                    file_data = ?6,
                    created_at = COALESCE(?7, created_at),
                    due_date = ?8
                 WHERE id = ?9",
                params![
                    update.title,
                    update.file_url,
                    file.mime,
                    file.size,
                    file.name,
                    file.data,
                    update.created_at.as_ref().map(format_datetime),
                    update.due_date.as_ref().map(format_datetime),
                    update.id,
                ],
            )?,
            None => self.conn().execute(
                "UPDATE documents SET
                    title = ?1,
                    file_url = ?2,
                    created_at = COALESCE(?3, created_at),
                    due_date = ?4
                 WHERE id = ?5",
                params![
                    update.title,
                    update.file_url,
                    update.created_at.as_ref().map(format_datetime),
                    update.due_date.as_ref().map(format_datetime),
                    update.id,
                ],
            )?,
        };

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn set_document_due_date(&self, id: &str, due_date: Option<DateTime<Utc>>) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE documents SET due_date = ?1 WHERE id = ?2",
            params![due_date.as_ref().map(format_datetime), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_document(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM comments WHERE document_id = ?1", params![id])?;
        tx.execute("DELETE FROM sheets WHERE document_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn get_document_file(&self, id: &str) -> Result<Option<FileBlob>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COALESCE(file_mime, 'application/octet-stream'),
                    COALESCE(file_name, 'file.bin'),
                    file_size,
                    file_data
             FROM documents WHERE id = ?1 AND file_data IS NOT NULL",
            params![id],
            |row| {
                Ok(FileBlob {
                    mime: row.get(0)?,
                    name: row.get(1)?,
                    size: row.get(2)?,
                    data: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Sheet operations

    fn put_sheet(&self, document_id: &str, sheet: &Sheet) -> Result<()> {
        let headers = serde_json::to_string(&sheet.headers)?;
        let rows = serde_json::to_string(&sheet.rows)?;

        self.conn().execute(
            "INSERT INTO sheets (document_id, headers, rows) VALUES (?1, ?2, ?3)
             ON CONFLICT (document_id) DO UPDATE SET
                headers = excluded.headers,
                rows = excluded.rows",
            params![document_id, headers, rows],
        )?;
        Ok(())
    }

    fn get_sheet(&self, document_id: &str) -> Result<Option<Sheet>> {
        let conn = self.conn();
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT headers, rows FROM sheets WHERE document_id = ?1",
                params![document_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((headers, rows)) => Ok(Some(Sheet {
                headers: serde_json::from_str(&headers)?,
                rows: serde_json::from_str(&rows)?,
            })),
            None => Ok(None),
        }
    }

    // Comment operations

    fn create_comment(&self, comment: &Comment) -> Result<()> {
        self.conn().execute(
            "INSERT INTO comments (id, document_id, row_index, col_index, field,
                                   comment, reviewer, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                comment.id,
                comment.document_id,
                comment.row_index,
                comment.col_index,
                comment.field,
                comment.comment,
                comment.reviewer,
                comment.status.as_str(),
                format_datetime(&comment.created_at),
            ],
        )?;
        Ok(())
    }

    fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, document_id, row_index, col_index, field,
                    comment, reviewer, status, created_at
             FROM comments WHERE document_id = ?1
             ORDER BY status = 'Open' DESC, created_at DESC",
        )?;

        let rows = stmt.query_map(params![document_id], comment_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn toggle_comment(&self, id: &str) -> Result<Option<CommentStatus>> {
        let conn = self.conn();

        let rows = conn.execute(
            "UPDATE comments
             SET status = CASE WHEN status = 'Open' THEN 'Resolved' ELSE 'Open' END
             WHERE id = ?1",
            params![id],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        let status: String = conn.query_row(
            "SELECT status FROM comments WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        Ok(Some(parse_status(&status)))
    }
}
