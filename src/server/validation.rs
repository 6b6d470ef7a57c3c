use crate::server::response::ApiError;

/// Rejects empty (or whitespace-only) required form fields before any store
/// mutation happens.
pub fn require_field(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

/// Cell coordinates are 0-based and never negative.
pub fn validate_cell_index(value: i64, field: &str) -> Result<(), ApiError> {
    if value < 0 {
        return Err(ApiError::bad_request(format!(
            "{field} must be a non-negative integer"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field() {
        assert!(require_field("QA", "deptId").is_ok());
        assert!(require_field("", "deptId").is_err());
        assert!(require_field("   ", "title").is_err());
    }

    #[test]
    fn test_validate_cell_index() {
        assert!(validate_cell_index(0, "row").is_ok());
        assert!(validate_cell_index(12, "col").is_ok());
        assert!(validate_cell_index(-1, "row").is_err());
    }
}
