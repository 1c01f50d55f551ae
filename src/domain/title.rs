use crate::error::{Result, SyncError};

/// Validates a display title and returns it trimmed
///
/// Titles that are empty or whitespace-only are rejected with
/// [`SyncError::EmptyTitle`].
pub fn validate_title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SyncError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
