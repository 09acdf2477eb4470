//! File-backed session store.
//!
//! Each session is one JSON document mapping keys to versioned records.
//! Reads go straight to the document (it is only ever replaced by rename).
//! Commits take an exclusive lock on a sibling `.lock` file, re-read the
//! document, check versions and write it back atomically. `commit` polls for
//! the lock with thread sleeps and belongs on a blocking thread; `try_commit`
//! takes it only if it is free.

use super::{PendingWrite, Record, SessionStore, check_versions};
use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS, STORE_LOCK_TIMEOUT};
use crate::core::{Result, SiteGenError};
use crate::utils::fs::{ensure_dir, write_json_file};
use fs4::fs_std::FileExt;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

type Document = BTreeMap<String, Record>;

/// A [`SessionStore`] persisted as `<dir>/<session>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Exclusive lock on the store's lock file, released on drop.
struct StoreLock {
    _file: File,
}

impl FileStore {
    /// Open (lazily) the store for `session` under `dir`.
    pub fn open(dir: &Path, session: &str) -> Result<Self> {
        ensure_dir(dir).map_err(|e| SiteGenError::StoreError {
            reason: format!("{e:#}"),
        })?;
        Ok(Self {
            path: dir.join(format!("{session}.json")),
            lock_path: dir.join(format!(".{session}.lock")),
        })
    }

    /// Path of the backing JSON document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document> {
        if !self.path.exists() {
            return Ok(Document::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&content).map_err(|e| SiteGenError::StoreError {
            reason: format!("{} is corrupted: {e}", self.path.display()),
        })
    }

    fn open_lock_file(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?)
    }

    /// Take the lock if it is free.
    fn try_acquire(&self) -> Result<Option<StoreLock>> {
        let file = self.open_lock_file()?;
        match file.try_lock_exclusive() {
            Ok(true) => Ok(Some(StoreLock {
                _file: file,
            })),
            Ok(false) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Wait for the lock, sleeping the current thread between attempts.
    fn acquire(&self) -> Result<StoreLock> {
        let start = Instant::now();
        // 10ms, 20ms, 40ms... capped at 500ms
        let backoff = ExponentialBackoff::from_millis(2)
            .factor(STARTING_BACKOFF_DELAY_MS / 2)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS));

        for delay in backoff {
            if let Some(lock) = self.try_acquire()? {
                debug!(
                    path = %self.lock_path.display(),
                    wait_ms = start.elapsed().as_millis(),
                    "Store lock acquired"
                );
                return Ok(lock);
            }
            let remaining = STORE_LOCK_TIMEOUT.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(delay.min(remaining));
        }

        Err(SiteGenError::StoreError {
            reason: format!(
                "timeout acquiring store lock {} after {:?}",
                self.lock_path.display(),
                STORE_LOCK_TIMEOUT
            ),
        })
    }

    /// Apply `writes` while holding the lock.
    fn apply(&self, _lock: &StoreLock, writes: Vec<PendingWrite>) -> Result<()> {
        let mut document = self.read_document()?;
        check_versions(&writes, |key| document.get(key))?;

        for write in writes {
            let version = document.get(&write.key).map_or(0, |record| record.version) + 1;
            document.insert(
                write.key,
                Record {
                    version,
                    value: write.value,
                },
            );
        }

        write_json_file(&self.path, &document, true).map_err(|e| SiteGenError::StoreError {
            reason: format!("{e:#}"),
        })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Record>> {
        Ok(self.read_document()?.remove(key))
    }

    fn commit(&self, writes: Vec<PendingWrite>) -> Result<()> {
        let lock = self.acquire()?;
        self.apply(&lock, writes)
    }

    fn try_commit(&self, writes: Vec<PendingWrite>) -> Result<()> {
        match self.try_acquire()? {
            Some(lock) => self.apply(&lock, writes),
            None => Err(SiteGenError::StoreBusy {
                path: self.lock_path.display().to_string(),
            }),
        }
    }
}
