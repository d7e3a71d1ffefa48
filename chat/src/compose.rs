use thiserror::Error;

use crate::model::MAX_CONTENT_CHARS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("message is empty")]
    Empty,
    #[error("message is {len} characters, the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Turn composer input into message content: trimmed, non-empty and within
/// [`MAX_CONTENT_CHARS`].
pub fn validate_draft(input: &str) -> Result<String, DraftError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DraftError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_CONTENT_CHARS {
        return Err(DraftError::TooLong {
            len,
            max: MAX_CONTENT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
