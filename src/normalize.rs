use chrono::{DateTime, NaiveDate, Utc};

pub const MAX_DEPARTMENT_SLUG_LEN: usize = 12;
pub const MAX_GROUP_SLUG_LEN: usize = 24;

/// Parses a form date as `YYYY-MM-DD` or `DD/MM/YYYY` into a UTC midnight
/// timestamp. Empty or malformed input normalizes to `None`, never to an
/// error.
#[must_use]
pub fn normalize_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()?;

    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Deterministic department id: uppercase, all whitespace removed,
/// truncated to [`MAX_DEPARTMENT_SLUG_LEN`] characters.
#[must_use]
pub fn department_slug(name: &str) -> String {
    name.to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_DEPARTMENT_SLUG_LEN)
        .collect()
}

/// Deterministic group id: uppercase with each whitespace run collapsed to a
/// single underscore, truncated to [`MAX_GROUP_SLUG_LEN`] characters.
#[must_use]
pub fn group_slug(name: &str) -> String {
    let mut out = String::new();
    let mut in_whitespace = false;

    for c in name.to_uppercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            out.push(c);
        }
    }

    out.chars().take(MAX_GROUP_SLUG_LEN).collect()
}
