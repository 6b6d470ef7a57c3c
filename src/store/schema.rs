pub const SCHEMA: &str = r#"
-- Reference data: soft-deleted via active=0, never removed
CREATE TABLE IF NOT EXISTS departments (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    year INTEGER
);

CREATE TABLE IF NOT EXISTS doc_groups (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    year INTEGER
);

-- Documents reference departments/groups by id only; reference rows are
-- soft-deleted, so no FK is enforced here
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    dept_id TEXT NOT NULL,
    group_id TEXT,
    title TEXT NOT NULL,

    -- External link XOR inline upload
    file_url TEXT,
    file_mime TEXT,
    file_size INTEGER,
    file_name TEXT,
    file_data BLOB,

    created_at TEXT NOT NULL,
    due_date TEXT
);

-- Imported tabular data, 1:1 with a document; header/row lists stored as JSON
CREATE TABLE IF NOT EXISTS sheets (
    document_id TEXT PRIMARY KEY REFERENCES documents(id) ON DELETE CASCADE,
    headers TEXT NOT NULL,
    rows TEXT NOT NULL
);

-- Per-cell reviewer comments
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    row_index INTEGER NOT NULL,
    col_index INTEGER NOT NULL,
    field TEXT,
    comment TEXT NOT NULL,
    reviewer TEXT,
    status TEXT NOT NULL DEFAULT 'Open',
    created_at TEXT NOT NULL
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_documents_dept ON documents(dept_id);
CREATE INDEX IF NOT EXISTS idx_documents_group ON documents(group_id);
CREATE INDEX IF NOT EXISTS idx_comments_document ON comments(document_id);
"#;
