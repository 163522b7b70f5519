//! Waveform cache persistence.
//!
//! Serialises waveform cache entries as `(key, value, timestamp)` JSON
//! records in a sled tree so a session can resume without re-downloading.
//! Writes are not flushed per entry; sled's background flushing is
//! sufficient because every record can be regenerated from the archive.

use crate::types::Waveform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StorageError {
    fn from(e: sled::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// One persisted cache record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredWaveform {
    key: String,
    value: Waveform,
    timestamp: DateTime<Utc>,
}

/// Sled-backed waveform cache store.
#[derive(Clone)]
pub struct WaveformStore {
    db: sled::Db,
}

impl WaveformStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub fn store(&self, key: &str, waveform: &Waveform) -> Result<(), StorageError> {
        let record =
            StoredWaveform { key: key.to_string(), value: waveform.clone(), timestamp: Utc::now() };
        let bytes = serde_json::to_vec(&record)?;
        self.db.insert(key.as_bytes(), bytes)?;
        debug!(key, "Persisted waveform cache entry");
        Ok(())
    }

    /// Load an entry no older than `max_age_hours`; stale records are
    /// removed on access.
    pub fn load(&self, key: &str, max_age_hours: i64) -> Result<Option<Waveform>, StorageError> {
        let Some(bytes) = self.db.get(key.as_bytes())? else {
            return Ok(None);
        };
        let record: StoredWaveform = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(key, error = %e, "Dropping unreadable cache record");
                self.db.remove(key.as_bytes())?;
                return Ok(None);
            }
        };
        if Utc::now() - record.timestamp > chrono::Duration::hours(max_age_hours) {
            self.db.remove(key.as_bytes())?;
            return Ok(None);
        }
        Ok(Some(record.value))
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.db.clear()?;
        Ok(())
    }
}
