//! Preferences: settings model and persistent key-value storage
//!
//! # Components
//! - `settings.rs`: Game type, grid type and validated settings
//! - `repository.rs`: Key-value store trait with JSON file and in-memory backends

pub mod repository;
pub mod settings;

pub use repository::{JsonFileRepository, MemoryRepository, PreferencesRepository};
pub use settings::{GameType, GridType, Modality, Settings, SettingsError};
