use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] idnote_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("No list row numbered {0}")]
    RowOutOfRange(usize),
    #[error("Unknown command `{0}`; type `help` for the available commands")]
    UnknownCommand(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Remote store is not configured. Run `idnote config init --supabase-url <URL> --supabase-anon-key <KEY>`, set IDNOTE_SUPABASE_URL and IDNOTE_SUPABASE_ANON_KEY, or pass --ephemeral."
    )]
    StoreNotConfigured,
}
