//! List snapshot and preview rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identifier, NoteRecord};

/// Characters shown before a preview is cut off.
pub const PREVIEW_CHARS: usize = 30;
/// Appended to truncated previews.
pub const PREVIEW_ELLIPSIS: char = '…';
/// Shown instead of a preview when a note has no content.
pub const EMPTY_PREVIEW: &str = "(empty)";

/// One row of the list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub identifier: Identifier,
    pub content: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ListRow {
    /// Preview text: the first [`PREVIEW_CHARS`] characters plus an ellipsis
    /// when longer, or [`EMPTY_PREVIEW`] for empty content.
    #[must_use]
    pub fn preview(&self) -> String {
        note_preview(&self.content)
    }
}

impl From<NoteRecord> for ListRow {
    fn from(record: NoteRecord) -> Self {
        Self {
            identifier: record.identifier,
            content: record.content,
            last_modified: record.last_modified,
        }
    }
}

/// Render list preview text for `content`.
#[must_use]
pub fn note_preview(content: &str) -> String {
    if content.is_empty() {
        return EMPTY_PREVIEW.to_string();
    }

    let mut chars = content.chars();
    let mut preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        preview.push(PREVIEW_ELLIPSIS);
    }
    preview
}

/// Full ordered scan of all notes, ascending by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    rows: Vec<ListRow>,
}

impl ListSnapshot {
    /// Build a snapshot from scan results, sorting them by identifier.
    #[must_use]
    pub fn from_records(records: Vec<NoteRecord>) -> Self {
        let mut rows: Vec<ListRow> = records.into_iter().map(ListRow::from).collect();
        rows.sort_by(|left, right| left.identifier.cmp(&right.identifier));
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by identifier
    #[must_use]
    pub fn row(&self, identifier: &Identifier) -> Option<&ListRow> {
        self.rows.iter().find(|row| &row.identifier == identifier)
    }

    /// Replace the content and timestamp of the row for `record.identifier`.
    ///
    /// Returns `false` when no such row exists; the snapshot is left untouched.
    pub fn patch(&mut self, record: &NoteRecord) -> bool {
        match self
            .rows
            .iter_mut()
            .find(|row| row.identifier == record.identifier)
        {
            Some(row) => {
                row.content.clone_from(&record.content);
                row.last_modified = record.last_modified;
                true
            }
            None => false,
        }
    }
}
