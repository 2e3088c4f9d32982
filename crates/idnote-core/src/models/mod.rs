//! Data models for idnote

mod identifier;
mod list;
mod note;

pub use identifier::{filter_identifier_input, Identifier};
pub use list::{
    note_preview, ListRow, ListSnapshot, EMPTY_PREVIEW, PREVIEW_CHARS, PREVIEW_ELLIPSIS,
};
pub use note::{validate_content, NoteRecord, MAX_CONTENT_CHARS};
