//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identifier;
use crate::error::{Error, Result};

/// Maximum note length, counted in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// A note as stored remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Unique key
    pub identifier: Identifier,
    /// Plain text content, empty when unset
    pub content: String,
    /// Set by the store on upsert; absent for unset notes or stores without the column
    pub last_modified: Option<DateTime<Utc>>,
}

impl NoteRecord {
    /// Create a record with the given content and no timestamp
    #[must_use]
    pub fn new(identifier: Identifier, content: impl Into<String>) -> Self {
        Self {
            identifier,
            content: content.into(),
            last_modified: None,
        }
    }

    /// The record used when the store has no row for `identifier`
    #[must_use]
    pub fn unset(identifier: Identifier) -> Self {
        Self::new(identifier, String::new())
    }

    /// Check if note content is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Reject content longer than [`MAX_CONTENT_CHARS`] characters.
///
/// Length is counted in Unicode scalar values, so an emoji counts once even
/// where a UTF-16 length would count it twice.
pub fn validate_content(content: &str) -> Result<()> {
    let length = content.chars().count();
    if length > MAX_CONTENT_CHARS {
        return Err(Error::ContentTooLong {
            length,
            max: MAX_CONTENT_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Identifier {
        Identifier::parse(raw).unwrap()
    }

    #[test]
    fn test_unset_record_is_empty() {
        let record = NoteRecord::unset(id("12345"));
        assert!(record.is_empty());
        assert!(record.last_modified.is_none());
    }

    #[test]
    fn test_validate_content_boundary() {
        assert!(validate_content(&"a".repeat(MAX_CONTENT_CHARS)).is_ok());
        let error = validate_content(&"a".repeat(MAX_CONTENT_CHARS + 1)).unwrap_err();
        assert!(matches!(
            error,
            Error::ContentTooLong {
                length: 501,
                max: 500
            }
        ));
    }

    #[test]
    fn test_validate_content_counts_emoji_once() {
        assert!(validate_content(&"😀".repeat(MAX_CONTENT_CHARS)).is_ok());
        assert!(validate_content(&"😀".repeat(MAX_CONTENT_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_content_counts_characters_not_bytes() {
        // 500 three-byte characters stay within the limit
        assert!(validate_content(&"字".repeat(MAX_CONTENT_CHARS)).is_ok());
    }
}
