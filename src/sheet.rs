use crate::types::{Comment, CommentStatus, Sheet};

/// Parses CSV text into a [`Sheet`]: the first non-empty line becomes the
/// headers, every following non-empty line a row.
///
/// This is a deliberately naive parser. Lines split on `,` with no quoting
/// or escape support, so a quoted field containing a comma splits into two
/// cells. Known limitation of the import format.
#[must_use]
pub fn parse_csv(text: &str) -> Sheet {
    let mut lines = text.lines().filter(|l| !l.is_empty());

    let headers = match lines.next() {
        Some(line) => split_row(line),
        None => Vec::new(),
    };
    let rows = lines.map(split_row).collect();

    Sheet { headers, rows }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',').map(str::to_string).collect()
}

/// True iff any comment anchored at cell `(row, col)` is still open.
/// Linear scan; comment lists stay small (tens to low hundreds of rows).
#[must_use]
pub fn cell_has_open_comment(comments: &[Comment], row: i64, col: i64) -> bool {
    comments.iter().any(|c| {
        c.row_index == row && c.col_index == col && c.status == CommentStatus::Open
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_csv_basic() {
        let sheet = parse_csv("a,b\n1,2\n3,4");
        assert_eq!(sheet.headers, vec!["a", "b"]);
        assert_eq!(sheet.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_parse_csv_skips_empty_lines() {
        let sheet = parse_csv("a,b\r\n\r\n1,2\n\n");
        assert_eq!(sheet.headers, vec!["a", "b"]);
        assert_eq!(sheet.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_parse_csv_ragged_rows_kept_as_is() {
        let sheet = parse_csv("a,b,c\n1,2");
        assert_eq!(sheet.headers.len(), 3);
        assert_eq!(sheet.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_parse_csv_empty_input() {
        let sheet = parse_csv("");
        assert!(sheet.headers.is_empty());
        assert!(sheet.rows.is_empty());
    }

    fn comment_at(row: i64, col: i64, status: CommentStatus) -> Comment {
        Comment {
            id: format!("c-{row}-{col}"),
            document_id: "doc-1".to_string(),
            row_index: row,
            col_index: col,
            field: None,
            comment: "check this".to_string(),
            reviewer: None,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cell_has_open_comment() {
        let comments = vec![
            comment_at(0, 0, CommentStatus::Resolved),
            comment_at(0, 0, CommentStatus::Open),
            comment_at(2, 1, CommentStatus::Resolved),
        ];

        assert!(cell_has_open_comment(&comments, 0, 0));
        assert!(!cell_has_open_comment(&comments, 2, 1));
        assert!(!cell_has_open_comment(&comments, 5, 5));
    }
}
