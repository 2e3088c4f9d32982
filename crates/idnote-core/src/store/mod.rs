//! Remote note store abstraction.
//!
//! A store exposes three operations against one table keyed by identifier:
//! point read, point upsert (insert-or-replace, last write wins) and a full
//! scan ordered ascending by identifier.

mod memory;
mod supabase;

use std::future::Future;

use thiserror::Error;

use crate::models::{Identifier, NoteRecord};

pub use memory::{MemoryNoteStore, StoreStats};
pub use supabase::{normalize_rest_url, SupabaseNoteStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Remote store is not configured.")]
    NotConfigured,
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store API error: {0}")]
    Api(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations for notes
pub trait NoteStore: Send + Sync {
    /// Point read; `Ok(None)` when no row exists for `identifier`
    fn fetch(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = StoreResult<Option<NoteRecord>>> + Send;

    /// Insert or replace the row for `identifier`, returning the stored record
    fn upsert(
        &self,
        identifier: &Identifier,
        content: &str,
    ) -> impl Future<Output = StoreResult<NoteRecord>> + Send;

    /// All rows, ascending by identifier
    fn scan(&self) -> impl Future<Output = StoreResult<Vec<NoteRecord>>> + Send;
}
