//! In-memory session store.

use super::{PendingWrite, Record, SessionStore, check_versions};
use crate::core::{Result, SiteGenError};
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`SessionStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Record>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> SiteGenError {
        SiteGenError::StoreError {
            reason: "memory store lock poisoned".to_string(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Record>> {
        let records = self.records.lock().map_err(|_| Self::poisoned())?;
        Ok(records.get(key).cloned())
    }

    fn commit(&self, writes: Vec<PendingWrite>) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| Self::poisoned())?;
        check_versions(&writes, |key| records.get(key))?;

        for write in writes {
            let version = records.get(&write.key).map_or(0, |record| record.version) + 1;
            records.insert(
                write.key,
                Record {
                    version,
                    value: write.value,
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concurrent_writers_one_wins() {
        let store = MemoryStore::new();
        let first = PendingWrite {
            key: "buffer".to_string(),
            expected_version: 0,
            value: json!(["a"]),
        };
        let second = PendingWrite {
            key: "buffer".to_string(),
            expected_version: 0,
            value: json!(["b"]),
        };

        store.commit(vec![first]).unwrap();
        assert!(matches!(store.commit(vec![second]), Err(SiteGenError::StoreConflict { .. })));
        assert_eq!(store.get("buffer").unwrap().unwrap().value, json!(["a"]));
    }
}
