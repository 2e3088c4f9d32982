//! Process-lifetime note cache.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Identifier, NoteRecord};

/// Last-known content for one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedNote {
    pub content: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Identifier → last-known note, filled on every successful read or write.
///
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct NoteCache {
    entries: HashMap<Identifier, CachedNote>,
}

impl NoteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, identifier: &Identifier) -> Option<&CachedNote> {
        self.entries.get(identifier)
    }

    /// Rebuild the cached record for `identifier`, if present.
    #[must_use]
    pub fn record(&self, identifier: &Identifier) -> Option<NoteRecord> {
        self.get(identifier).map(|cached| NoteRecord {
            identifier: identifier.clone(),
            content: cached.content.clone(),
            last_modified: cached.last_modified,
        })
    }

    pub fn insert(&mut self, record: &NoteRecord) {
        self.entries.insert(
            record.identifier.clone(),
            CachedNote {
                content: record.content.clone(),
                last_modified: record.last_modified,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites() {
        let id = Identifier::parse("42").unwrap();
        let mut cache = NoteCache::new();

        cache.insert(&NoteRecord::new(id.clone(), "first"));
        cache.insert(&NoteRecord::new(id.clone(), "second"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id).unwrap().content, "second");
        assert_eq!(cache.record(&id).unwrap().identifier, id);
    }

    #[test]
    fn test_missing_entry() {
        let cache = NoteCache::new();
        let id = Identifier::parse("1").unwrap();
        assert!(cache.get(&id).is_none());
        assert!(cache.record(&id).is_none());
    }
}
