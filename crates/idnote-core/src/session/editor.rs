//! Note editor state and the single in-flight save guard.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::models::NoteRecord;

pub const EDIT_LABEL: &str = "Edit";
pub const SAVE_LABEL: &str = "Save";

/// Read-only/editable buffer for the note on the Detail panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    content: String,
    draft: String,
    editing: bool,
    last_modified: Option<DateTime<Utc>>,
}

impl EditorState {
    /// Text currently displayed: the draft while editing, else the loaded content
    #[must_use]
    pub fn displayed(&self) -> &str {
        if self.editing {
            &self.draft
        } else {
            &self.content
        }
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing
    }

    #[must_use]
    pub const fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Label of the edit/save action control
    #[must_use]
    pub const fn action_label(&self) -> &'static str {
        if self.editing {
            SAVE_LABEL
        } else {
            EDIT_LABEL
        }
    }

    /// Empty and read-only.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Display a loaded record. An untouched draft follows the new content.
    pub fn show(&mut self, record: &NoteRecord) {
        if self.editing && self.draft == self.content {
            self.draft.clone_from(&record.content);
        }
        self.content.clone_from(&record.content);
        self.last_modified = record.last_modified;
    }

    /// Display a freshly saved record. Returns to read-only unless the draft
    /// changed after `submitted` was sent, in which case the newer draft stays.
    pub fn saved(&mut self, record: &NoteRecord, submitted: &str) {
        if !(self.editing && self.draft != submitted) {
            self.editing = false;
            self.draft.clear();
        }
        self.content.clone_from(&record.content);
        self.last_modified = record.last_modified;
    }

    pub fn begin_edit(&mut self) {
        if !self.editing {
            self.editing = true;
            self.draft.clone_from(&self.content);
        }
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn end_edit(&mut self) {
        self.editing = false;
        self.draft.clear();
    }
}

/// Claims the in-flight flag; dropping the guard always releases it.
#[derive(Debug)]
pub struct SaveGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SaveGuard<'a> {
    /// Returns `None` if a save already holds the flag.
    pub fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
