//! Persistent keyed session store with optimistic concurrency.
//!
//! The onboarding session keeps its variant set, regeneration buffer,
//! palette cache and finalize checkpoints as single keyed records. Two
//! requests racing on the same record (a double-submitted "regenerate", for
//! example) must not silently overwrite each other, so every record carries a
//! version stamp and every write states the version it expects to replace.
//!
//! # Model
//!
//! - [`SessionStore::get`] returns the current [`Record`] (value + version).
//! - [`SessionStore::commit`] applies a batch of [`PendingWrite`]s atomically.
//!   If any key's current version differs from the write's
//!   `expected_version` (0 meaning "absent"), nothing is written and
//!   [`SiteGenError::StoreConflict`] is returned.
//! - [`SessionStore::try_commit`] is the same but never waits for a lock;
//!   it fails with [`SiteGenError::StoreBusy`] instead.
//! - [`retry_on_conflict`] reruns a read-modify-write closure with
//!   exponential backoff when it loses such a race, and sleeps on the async
//!   timer while the store is busy. Closures passed to it commit with
//!   [`Transaction::try_commit`] so no runtime worker blocks on a lock.
//!
//! # Implementations
//!
//! - [`MemoryStore`] for tests and embedding
//! - [`FileStore`] for the CLI: one JSON document per session, commits
//!   serialized through an exclusive file lock

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::constants::{
    MAX_BACKOFF_DELAY_MS, MAX_STORE_ATTEMPTS, STARTING_BACKOFF_DELAY_MS, STORE_LOCK_TIMEOUT,
};
use crate::core::{Result, SiteGenError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

/// A stored value together with its version stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Incremented on every successful write; never 0 for a present record
    pub version: u64,
    /// The stored JSON value
    pub value: Value,
}

/// A write that only succeeds if the key is still at `expected_version`.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    /// Store key
    pub key: String,
    /// Version the caller read; 0 if the key was absent
    pub expected_version: u64,
    /// New value
    pub value: Value,
}

/// Keyed configuration store shared by every component of a session.
///
/// There is no locking across calls: correctness under concurrent requests
/// comes entirely from the version check in [`SessionStore::commit`].
pub trait SessionStore: Send + Sync {
    /// Read the current record for `key`.
    fn get(&self, key: &str) -> Result<Option<Record>>;

    /// Apply all writes or none, waiting for any lock the store needs.
    fn commit(&self, writes: Vec<PendingWrite>) -> Result<()>;

    /// Like [`SessionStore::commit`], but fail with [`SiteGenError::StoreBusy`]
    /// rather than wait for a lock.
    fn try_commit(&self, writes: Vec<PendingWrite>) -> Result<()> {
        self.commit(writes)
    }
}

/// A typed read of a store key, remembering the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Decoded value (the type's default when the key is absent)
    pub value: T,
    /// Version the value was read at; 0 when the key is absent
    pub version: u64,
}

/// Read `key` as `T`, falling back to `T::default()` when absent.
pub fn load<T>(store: &dyn SessionStore, key: &str) -> Result<Snapshot<T>>
where
    T: DeserializeOwned + Default,
{
    let snapshot = load_optional(store, key)?;
    Ok(Snapshot {
        value: snapshot.value.unwrap_or_default(),
        version: snapshot.version,
    })
}

/// Read `key` as `T`, keeping absence (and JSON `null`) visible as `None`.
pub fn load_optional<T>(store: &dyn SessionStore, key: &str) -> Result<Snapshot<Option<T>>>
where
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(record) if !record.value.is_null() => {
            let value = serde_json::from_value(record.value).map_err(|e| {
                SiteGenError::StoreError {
                    reason: format!("record '{key}' has an unexpected shape: {e}"),
                }
            })?;
            Ok(Snapshot {
                value: Some(value),
                version: record.version,
            })
        }
        Some(record) => Ok(Snapshot {
            value: None,
            version: record.version,
        }),
        None => Ok(Snapshot {
            value: None,
            version: 0,
        }),
    }
}

/// A batch of typed writes committed together.
#[derive(Debug, Default)]
pub struct Transaction {
    writes: Vec<PendingWrite>,
}

impl Transaction {
    /// Start an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write of `value` to `key`, expected to still be at `expected_version`.
    pub fn put<T: Serialize>(
        &mut self,
        key: &str,
        expected_version: u64,
        value: &T,
    ) -> Result<&mut Self> {
        self.writes.push(PendingWrite {
            key: key.to_string(),
            expected_version,
            value: serde_json::to_value(value)?,
        });
        Ok(self)
    }

    /// Whether nothing has been queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Commit the batch, blocking while the store is locked.
    pub fn commit(self, store: &dyn SessionStore) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        store.commit(self.writes)
    }

    /// Commit the batch without waiting for the store lock.
    pub fn try_commit(self, store: &dyn SessionStore) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        store.try_commit(self.writes)
    }
}

fn backoff() -> ExponentialBackoff {
    // 10ms, 20ms, 40ms... capped at 500ms
    ExponentialBackoff::from_millis(2)
        .factor(STARTING_BACKOFF_DELAY_MS / 2)
        .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
}

/// Run a read-modify-write closure, retrying when it loses a version race.
///
/// The closure must re-read everything it writes on each attempt. A
/// [`SiteGenError::StoreConflict`] is retried up to the attempt limit; a
/// [`SiteGenError::StoreBusy`] is waited out until [`STORE_LOCK_TIMEOUT`].
/// Any other error is returned immediately. Delays follow 10ms, 20ms,
/// 40ms... capped at 500ms.
pub async fn retry_on_conflict<T, F>(operation: &str, mut attempt_fn: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut conflict_delays = backoff().take(MAX_STORE_ATTEMPTS - 1);
    let mut busy_delays = backoff();
    let started = Instant::now();
    let mut attempt = 1;
    loop {
        match attempt_fn() {
            Err(SiteGenError::StoreConflict {
                key,
            }) => match conflict_delays.next() {
                Some(delay) => {
                    warn!(operation, key = %key, attempt, "Store conflict, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    debug!(operation, key = %key, "Store conflict retries exhausted");
                    return Err(SiteGenError::StoreConflict {
                        key,
                    });
                }
            },
            Err(SiteGenError::StoreBusy {
                path,
            }) => {
                let remaining = STORE_LOCK_TIMEOUT.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(SiteGenError::StoreError {
                        reason: format!(
                            "timeout acquiring store lock {path} after {STORE_LOCK_TIMEOUT:?}"
                        ),
                    });
                }
                let delay = busy_delays
                    .next()
                    .unwrap_or(Duration::from_millis(MAX_BACKOFF_DELAY_MS));
                debug!(operation, path = %path, "Store locked, waiting");
                tokio::time::sleep(delay.min(remaining)).await;
            }
            other => return other,
        }
    }
}

/// Check a batch against current versions. Shared by the implementations.
pub(crate) fn check_versions<'a>(
    writes: &[PendingWrite],
    current: impl Fn(&str) -> Option<&'a Record>,
) -> Result<()> {
    for write in writes {
        let found = current(&write.key).map_or(0, |record| record.version);
        if found != write.expected_version {
            debug!(
                key = %write.key,
                expected = write.expected_version,
                found,
                "Rejecting stale write"
            );
            return Err(SiteGenError::StoreConflict {
                key: write.key.clone(),
            });
        }
    }
    Ok(())
}
