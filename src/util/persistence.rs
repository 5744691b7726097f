//! Key/value draft store that outlives a single wizard step.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Error as SerdeError, Value};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "TripPlanner";
const APP_NAME: &str = "TripPlanner";
const DRAFT_FILENAME: &str = "draft.json";

/// Logical keys of the draft store. The string forms match the keys the
/// web client used, so a draft written by either can be inspected the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DraftKey {
    SessionId,
    WizardStep,
    TripDetails,
    TransportOption,
    SelectedAccommodation,
    SelectedFlight,
    TransportData,
    FlightsData,
    TransportFlightData,
    AccommodationData,
}

impl DraftKey {
    pub const ALL: [DraftKey; 10] = [
        DraftKey::SessionId,
        DraftKey::WizardStep,
        DraftKey::TripDetails,
        DraftKey::TransportOption,
        DraftKey::SelectedAccommodation,
        DraftKey::SelectedFlight,
        DraftKey::TransportData,
        DraftKey::FlightsData,
        DraftKey::TransportFlightData,
        DraftKey::AccommodationData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftKey::SessionId => "sessionId",
            DraftKey::WizardStep => "wizardStep",
            DraftKey::TripDetails => "tripDetails",
            DraftKey::TransportOption => "transportOption",
            DraftKey::SelectedAccommodation => "selectedAccommodation",
            DraftKey::SelectedFlight => "selectedFlight",
            DraftKey::TransportData => "transportData",
            DraftKey::FlightsData => "flightsData",
            DraftKey::TransportFlightData => "transportFlightData",
            DraftKey::AccommodationData => "accommodationData",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DraftStoreError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

pub trait DraftStore {
    fn put(&mut self, key: DraftKey, value: Value) -> Result<(), DraftStoreError>;

    fn get(&self, key: DraftKey) -> Option<Value>;

    fn remove(&mut self, keys: &[DraftKey]) -> Result<(), DraftStoreError>;

    fn put_json<T: Serialize>(&mut self, key: DraftKey, value: &T) -> Result<(), DraftStoreError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value)?;
        self.put(key, value)
    }

    /// Missing keys and values that no longer decode both read as `None`.
    fn get_json<T: DeserializeOwned>(&self, key: DraftKey) -> Option<T>
    where
        Self: Sized,
    {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    fn contains(&self, key: DraftKey) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryDraftStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn put(&mut self, key: DraftKey, value: Value) -> Result<(), DraftStoreError> {
        self.entries.insert(key.as_str().to_string(), value);
        Ok(())
    }

    fn get(&self, key: DraftKey) -> Option<Value> {
        self.entries.get(key.as_str()).cloned()
    }

    fn remove(&mut self, keys: &[DraftKey]) -> Result<(), DraftStoreError> {
        for key in keys {
            self.entries.remove(key.as_str());
        }
        Ok(())
    }
}

/// One JSON document on disk, rewritten on every change so a step's writes
/// are on disk before the next step loads them.
#[derive(Debug)]
pub struct FileDraftStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileDraftStore {
    /// Store under the platform config directory.
    pub fn open_default() -> Result<Self, DraftStoreError> {
        let dir = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(DraftStoreError::StorageUnavailable)?;
        Self::open_in(dir)
    }

    pub fn open_in(dir: impl AsRef<Path>) -> Result<Self, DraftStoreError> {
        Self::open(dir.as_ref().join(DRAFT_FILENAME))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DraftStoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding unreadable draft store");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), DraftStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DraftStore for FileDraftStore {
    fn put(&mut self, key: DraftKey, value: Value) -> Result<(), DraftStoreError> {
        self.entries.insert(key.as_str().to_string(), value);
        self.flush()
    }

    fn get(&self, key: DraftKey) -> Option<Value> {
        self.entries.get(key.as_str()).cloned()
    }

    fn remove(&mut self, keys: &[DraftKey]) -> Result<(), DraftStoreError> {
        let before = self.entries.len();
        for key in keys {
            self.entries.remove(key.as_str());
        }
        if self.entries.len() != before {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_put_get_remove() {
        let mut store = MemoryDraftStore::new();
        store.put(DraftKey::SelectedFlight, json!("f1")).unwrap();
        store.put(DraftKey::SelectedAccommodation, json!("h1")).unwrap();
        assert_eq!(store.get(DraftKey::SelectedFlight), Some(json!("f1")));

        store
            .remove(&[DraftKey::SelectedFlight, DraftKey::TripDetails])
            .unwrap();
        assert!(!store.contains(DraftKey::SelectedFlight));
        assert!(store.contains(DraftKey::SelectedAccommodation));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileDraftStore::open_in(dir.path()).unwrap();
            store
                .put_json(DraftKey::TripDetails, &json!({"name": "Summer"}))
                .unwrap();
        }

        let store = FileDraftStore::open_in(dir.path()).unwrap();
        let details: Value = store.get_json(DraftKey::TripDetails).unwrap();
        assert_eq!(details["name"], "Summer");
    }

    #[test]
    fn file_store_remove_is_durable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileDraftStore::open_in(dir.path()).unwrap();
        store.put(DraftKey::SelectedFlight, json!("f1")).unwrap();
        store.remove(&DraftKey::ALL).unwrap();

        let reopened = FileDraftStore::open_in(dir.path()).unwrap();
        assert!(!reopened.contains(DraftKey::SelectedFlight));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DRAFT_FILENAME), "{not json").unwrap();
        let store = FileDraftStore::open_in(dir.path()).unwrap();
        assert!(!store.contains(DraftKey::TripDetails));
    }
}
