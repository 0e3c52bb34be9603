//! Flat key-value preference storage
//!
//! Handles:
//! - Typed reads with a default per key
//! - Write-through persistence to a JSON file
//! - An in-memory store for tests

use super::settings::{GridType, Settings};
use crate::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage keys
pub mod keys {
    pub const HIGHSCORE: &str = "highscore";
    pub const N_BACK: &str = "nBack";
    pub const GRID_TYPE: &str = "gridType";
    pub const BLINK_DURATION: &str = "blinkDuration";
    pub const EVENT_INTERVAL: &str = "eventInterval";
    pub const NUMBER_OF_EVENTS: &str = "numberOfEvents";
    pub const COMPACT_GRID: &str = "compactGrid";
}

/// Stored form of `Settings`; field names serialize to the `keys` constants
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRecord {
    n_back: u32,
    grid_type: String,
    blink_duration: u64,
    event_interval: u64,
    number_of_events: u32,
    compact_grid: bool,
}

impl From<&Settings> for SettingsRecord {
    fn from(settings: &Settings) -> Self {
        SettingsRecord {
            n_back: settings.n_back,
            grid_type: settings.grid.to_string(),
            blink_duration: settings.blink_duration_ms,
            event_interval: settings.event_interval_ms,
            number_of_events: settings.number_of_events,
            compact_grid: settings.compact_grid,
        }
    }
}

/// Key-value store behind the game's persisted state.
///
/// Implementors provide raw `get`/`put`; the typed accessors map missing or
/// mistyped values to the key's default.
pub trait PreferencesRepository {
    fn get(&self, key: &str) -> Option<Value>;

    fn put(&mut self, key: &str, value: Value) -> Result<()>;

    fn highscore(&self) -> i32 {
        self.get(keys::HIGHSCORE)
            .and_then(|v| v.as_i64())
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0)
    }

    fn n_back(&self) -> u32 {
        self.get_u32(keys::N_BACK).unwrap_or(1)
    }

    fn grid_type(&self) -> GridType {
        self.get(keys::GRID_TYPE)
            .and_then(|v| v.as_str().and_then(|s| s.parse().ok()))
            .unwrap_or_default()
    }

    fn blink_duration(&self) -> u64 {
        self.get(keys::BLINK_DURATION)
            .and_then(|v| v.as_u64())
            .unwrap_or(1000)
    }

    fn event_interval(&self) -> u64 {
        self.get(keys::EVENT_INTERVAL)
            .and_then(|v| v.as_u64())
            .unwrap_or(2000)
    }

    fn number_of_events(&self) -> u32 {
        self.get_u32(keys::NUMBER_OF_EVENTS).unwrap_or(10)
    }

    fn compact_grid(&self) -> bool {
        self.get(keys::COMPACT_GRID)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key)
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }

    fn save_highscore(&mut self, score: i32) -> Result<()> {
        self.put(keys::HIGHSCORE, Value::from(score))
    }

    /// Persist every setting field
    fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        if let Value::Object(entries) = serde_json::to_value(SettingsRecord::from(settings))? {
            for (key, value) in entries {
                self.put(&key, value)?;
            }
        }
        debug!(?settings, "saved settings");
        Ok(())
    }

    /// Read all settings; an inconsistent stored combination yields defaults
    fn load_settings(&self) -> Settings {
        let settings = Settings {
            n_back: self.n_back(),
            grid: self.grid_type(),
            number_of_events: self.number_of_events(),
            event_interval_ms: self.event_interval(),
            blink_duration_ms: self.blink_duration(),
            compact_grid: self.compact_grid(),
        };
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                warn!(error = %e, "stored settings rejected, using defaults");
                Settings {
                    compact_grid: settings.compact_grid,
                    ..Settings::default()
                }
            }
        }
    }
}

/// Preferences held in a single JSON object on disk
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileRepository {
    /// Open the store at `path`. A missing, unreadable or corrupt file is
    /// logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "error reading preferences");
                } else {
                    debug!(path = %path.display(), "no preference file yet");
                }
                Map::new()
            }
        };
        JsonFileRepository { path, values }
    }

    fn read(path: &Path) -> Result<Map<String, Value>> {
        let content = fs::read_to_string(path)?;
        let values: Map<String, Value> = serde_json::from_str(&content)?;
        Ok(values)
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, serde_json::to_string_pretty(&self.values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferencesRepository for JsonFileRepository {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// Non-persistent store
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    values: Map<String, Value>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesRepository for MemoryRepository {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_yields_defaults() {
        let repo = MemoryRepository::new();
        assert_eq!(repo.highscore(), 0);
        assert_eq!(repo.load_settings(), Settings::default());
    }

    #[test]
    fn test_saved_settings_use_storage_keys() {
        let mut repo = MemoryRepository::new();
        repo.save_settings(&Settings::default()).unwrap();

        assert_eq!(repo.get(keys::N_BACK), Some(Value::from(1)));
        assert_eq!(repo.get(keys::GRID_TYPE), Some(Value::from("3x3")));
        assert_eq!(repo.get(keys::BLINK_DURATION), Some(Value::from(1000)));
        assert_eq!(repo.get(keys::EVENT_INTERVAL), Some(Value::from(2000)));
        assert_eq!(repo.get(keys::NUMBER_OF_EVENTS), Some(Value::from(10)));
        assert_eq!(repo.get(keys::COMPACT_GRID), Some(Value::from(false)));
        assert_eq!(repo.values.len(), 6);
    }

    #[test]
    fn test_older_grid_spelling_is_read() {
        let mut repo = MemoryRepository::new();
        repo.put(keys::GRID_TYPE, Value::from("Grid_5x5")).unwrap();
        assert_eq!(repo.grid_type(), GridType::Grid5x5);
    }

    #[test]
    fn test_mistyped_value_falls_back_to_default() {
        let mut repo = MemoryRepository::new();
        repo.put(keys::N_BACK, Value::from("three")).unwrap();
        repo.put(keys::GRID_TYPE, Value::from("9x9")).unwrap();
        assert_eq!(repo.n_back(), 1);
        assert_eq!(repo.grid_type(), GridType::Grid3x3);
    }

    #[test]
    fn test_inconsistent_settings_are_replaced() {
        let mut repo = MemoryRepository::new();
        repo.put(keys::N_BACK, Value::from(12)).unwrap();
        repo.put(keys::COMPACT_GRID, Value::from(true)).unwrap();
        let settings = repo.load_settings();
        assert_eq!(settings.n_back, 1);
        assert!(settings.compact_grid);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut repo = JsonFileRepository::open(&path);
        let settings = Settings {
            n_back: 3,
            grid: GridType::Grid4x4,
            number_of_events: 20,
            event_interval_ms: 2500,
            blink_duration_ms: 800,
            compact_grid: true,
        };
        repo.save_settings(&settings).unwrap();
        repo.save_highscore(66).unwrap();

        let reopened = JsonFileRepository::open(&path);
        assert_eq!(reopened.load_settings(), settings);
        assert_eq!(reopened.highscore(), 66);
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let mut repo = JsonFileRepository::open(&path);
        assert_eq!(repo.highscore(), 0);

        repo.save_highscore(10).unwrap();
        assert_eq!(JsonFileRepository::open(&path).highscore(), 10);
    }
}
