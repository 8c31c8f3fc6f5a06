use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::AppState;

const STATE_FILE: &str = "tracker_state.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse persisted state: {0}")]
    Decode(serde_json::Error),
    #[error("failed to encode state: {0}")]
    Encode(serde_json::Error),
}

/// The persistence seam: one JSON blob under one fixed key. A missing
/// blob loads as `None`, never as an error.
pub trait StateStore {
    fn load(&mut self) -> Result<Option<AppState>, StorageError>;
    fn save(&mut self, state: &AppState) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(default_state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<AppState>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err)),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        let state = serde_json::from_str(&raw).map_err(StorageError::Decode)?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &AppState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let blob = serde_json::to_string(state).map_err(StorageError::Encode)?;
        fs::write(&self.path, blob)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

/// In-process store for hosts that manage durability themselves, and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Option<AppState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self) -> Result<Option<AppState>, StorageError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &AppState) -> Result<(), StorageError> {
        self.state = Some(state.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.state = None;
        Ok(())
    }
}

pub fn default_state_path() -> PathBuf {
    state_dir().join(STATE_FILE)
}

fn state_dir() -> PathBuf {
    if let Some(path) = env::var_os("ALIGNER_TRACKER_STATE_DIR") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(path) = env::var_os("LOCALAPPDATA") {
            return PathBuf::from(path).join("aligner_tracker");
        }
    }

    if let Some(path) = env::var_os("XDG_STATE_HOME") {
        return PathBuf::from(path).join("aligner_tracker");
    }

    if let Some(path) = env::var_os("HOME") {
        return PathBuf::from(path)
            .join(".local")
            .join("state")
            .join("aligner_tracker");
    }

    PathBuf::from(".aligner_tracker")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{JsonFileStore, MemoryStore, StateStore};
    use crate::domain::AppState;
    use crate::schedule;

    fn configured_state() -> AppState {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 8, 0, 0).unwrap();
        let mut state = AppState::new(today, now);
        state.aligner_history =
            schedule::generate(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), 14, 20)
                .expect("schedule should generate");
        state.treatment_config.start_date = Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        state.treatment_config.configured = true;
        state.daily_timer.seconds_today = 4200;
        state.daily_usage_history.push(crate::domain::DailyUsage {
            date: NaiveDate::from_ymd_opt(2025, 1, 19).unwrap(),
            seconds_without_aligner: 3600,
            aligner_number: 1,
        });
        state
    }

    #[test]
    fn round_trips_app_state_through_json_file() {
        let mut store = JsonFileStore::new(temp_file("aligner_storage_roundtrip.json"));
        let state = configured_state();

        store.save(&state).expect("save should succeed");
        let loaded = store
            .load()
            .expect("load should succeed")
            .expect("state should be present");
        assert_eq!(loaded, state);

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let mut store = JsonFileStore::new(temp_file("aligner_storage_missing.json"));
        assert!(store.load().expect("load should succeed").is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut store = JsonFileStore::new(temp_file("aligner_storage_clear.json"));
        store.save(&configured_state()).expect("save should succeed");

        store.clear().expect("clear should succeed");
        assert!(store.load().expect("load should succeed").is_none());
        store.clear().expect("second clear should succeed");
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        assert!(store.load().expect("load should succeed").is_none());

        let state = configured_state();
        store.save(&state).expect("save should succeed");
        assert_eq!(store.load().expect("load should succeed"), Some(state));

        store.clear().expect("clear should succeed");
        assert!(store.load().expect("load should succeed").is_none());
    }

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}_{}", name, std::process::id()));
        path
    }
}
