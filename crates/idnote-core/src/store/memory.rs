//! In-process note store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use super::{NoteStore, StoreResult};
use crate::models::{Identifier, NoteRecord};

/// Request counters for a [`MemoryNoteStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub fetches: usize,
    pub upserts: usize,
    pub scans: usize,
}

/// Store backed by a process-local ordered map.
///
/// Behaves like the remote table (last write wins, timestamps assigned on
/// upsert) but lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    rows: Mutex<BTreeMap<Identifier, NoteRecord>>,
    fetches: AtomicUsize,
    upserts: AtomicUsize,
    scans: AtomicUsize,
}

impl MemoryNoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = NoteRecord>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| (record.identifier.clone(), record))
            .collect();
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            fetches: self.fetches.load(Ordering::SeqCst),
            upserts: self.upserts.load(Ordering::SeqCst),
            scans: self.scans.load(Ordering::SeqCst),
        }
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, BTreeMap<Identifier, NoteRecord>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NoteStore for MemoryNoteStore {
    async fn fetch(&self, identifier: &Identifier) -> StoreResult<Option<NoteRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows().get(identifier).cloned())
    }

    async fn upsert(&self, identifier: &Identifier, content: &str) -> StoreResult<NoteRecord> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let record = NoteRecord {
            identifier: identifier.clone(),
            content: content.to_string(),
            last_modified: Some(Utc::now()),
        };
        self.rows().insert(identifier.clone(), record.clone());
        Ok(record)
    }

    async fn scan(&self) -> StoreResult<Vec<NoteRecord>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows().values().cloned().collect())
    }
}
