//! Error types for idnote-core

use thiserror::Error;

use crate::models::Identifier;
use crate::session::{ActionKind, PanelKind};
use crate::store::StoreError;

/// Result type alias using idnote-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the user by session and store operations.
///
/// None of these are fatal: every variant leaves the session in a consistent,
/// interactive state.
#[derive(Error, Debug)]
pub enum Error {
    /// Submitted identifier was blank
    #[error("Please enter an identifier")]
    EmptyIdentifier,

    /// Submitted identifier contained something other than decimal digits
    #[error("Identifier must contain digits only: {0}")]
    InvalidIdentifier(String),

    /// Note content exceeds the length ceiling
    #[error("Content is too long ({length} characters); limit is {max}")]
    ContentTooLong { length: usize, max: usize },

    /// A save is already pending
    #[error("Save in progress, please wait")]
    SaveInProgress,

    /// Editor action issued without a loaded identifier
    #[error("No identifier loaded; return home and search again")]
    NoIdentifier,

    /// Draft change or commit issued while the editor is read-only
    #[error("Editor is read-only; start editing first")]
    NotEditing,

    /// Action is not permitted on the current panel
    #[error("`{action}` is not available on the {panel} panel")]
    ActionUnavailable {
        action: ActionKind,
        panel: PanelKind,
    },

    /// Selected row is not part of the list snapshot
    #[error("No list entry for identifier {0}")]
    UnknownRow(Identifier),

    /// Remote store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
