//! The marker store: named channels of sorted timestamps, with JSON
//! persistence.
//!
//! Channel sequences stay sorted ascending at all times. Equal timestamps
//! are allowed; a new one lands after the existing equals, so insertion
//! order is preserved among ties. All mutation happens on the clock-owning
//! thread.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Channel name → ordered timestamp sequence (seconds from track start).
///
/// Serializes to the exported file format directly: a JSON object whose keys
/// are channel names and whose values are ordered arrays of numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerStore {
    channels: BTreeMap<String, Vec<f64>>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty channel. Rejects names already present.
    pub fn add_channel(&mut self, name: &str) -> Result<(), StoreError> {
        if self.channels.contains_key(name) {
            return Err(StoreError::DuplicateChannel(name.to_string()));
        }
        self.channels.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Remove a channel and its markers.
    pub fn remove_channel(&mut self, name: &str) -> Result<(), StoreError> {
        self.channels
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownChannel(name.to_string()))
    }

    /// Create the channel if absent; an existing one is reused as-is.
    pub fn ensure_channel(&mut self, name: &str) {
        self.channels.entry(name.to_string()).or_default();
    }

    /// Sorted insert into an existing channel. Equal values keep their
    /// relative insertion order (the new one goes last among ties).
    pub fn insert_marker(&mut self, name: &str, timestamp: f64) -> Result<(), StoreError> {
        let seq = self
            .channels
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownChannel(name.to_string()))?;
        let at = seq.partition_point(|&t| t <= timestamp);
        seq.insert(at, timestamp);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn markers(&self, name: &str) -> Option<&[f64]> {
        self.channels.get(name).map(|seq| seq.as_slice())
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.channels.iter().map(|(name, seq)| (name.as_str(), seq.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Write the store to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a store from `path`, replacing nothing on failure. Channel
    /// sequences are re-sorted so the ordering invariant holds even for
    /// hand-edited files.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path)?;
        let mut store: Self = serde_json::from_str(&json)?;
        for seq in store.channels.values_mut() {
            seq.sort_by(|a, b| a.total_cmp(b));
        }
        Ok(store)
    }
}

/// Channel-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateChannel(String),
    UnknownChannel(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateChannel(name) => write!(f, "channel '{}' already exists", name),
            Self::UnknownChannel(name) => write!(f, "unknown channel '{}'", name),
        }
    }
}

impl std::error::Error for StoreError {}

/// Save/load errors.
#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for PersistenceError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for PersistenceError {}
