//! Game settings and their validation rules
//!
//! Holds:
//! - Game type (audio, visual, or both) and its active modalities
//! - Grid dimensions
//! - Timing (blink duration, event interval) and sequence length

use std::fmt;
use std::str::FromStr;

pub const MIN_N_BACK: u32 = 1;
pub const MAX_N_BACK: u32 = 50;
pub const MIN_EVENTS: u32 = 1;
pub const MAX_EVENTS: u32 = 100;
pub const MIN_INTERVAL_MS: u64 = 500;
pub const MIN_BLINK_MS: u64 = 100;
pub const MAX_TIMING_MS: u64 = 10_000;

/// Which stimulus streams a game presents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameType {
    /// Spoken letters only
    Audio,
    /// Grid positions only
    #[default]
    Visual,
    /// Positions and letters at the same time
    AudioVisual,
}

impl GameType {
    /// Modalities the player can respond to in this game type
    pub fn modalities(self) -> &'static [Modality] {
        match self {
            GameType::Audio => &[Modality::Audio],
            GameType::Visual => &[Modality::Position],
            GameType::AudioVisual => &[Modality::Position, Modality::Audio],
        }
    }

    pub fn has(self, modality: Modality) -> bool {
        self.modalities().contains(&modality)
    }

    pub fn label(self) -> &'static str {
        match self {
            GameType::Audio => "Audio",
            GameType::Visual => "Visual",
            GameType::AudioVisual => "Audio-Visual",
        }
    }
}

/// A single stimulus stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    Position,
    Audio,
}

impl Modality {
    /// Slot used for per-modality arrays
    pub fn slot(self) -> usize {
        match self {
            Modality::Position => 0,
            Modality::Audio => 1,
        }
    }
}

/// Square grid the position stimulus is drawn on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GridType {
    Grid2x2,
    #[default]
    Grid3x3,
    Grid4x4,
    Grid5x5,
}

impl GridType {
    pub const ALL: [GridType; 4] = [
        GridType::Grid2x2,
        GridType::Grid3x3,
        GridType::Grid4x4,
        GridType::Grid5x5,
    ];

    /// Grid for a side length; anything outside 2..=5 falls back to 3x3
    pub fn from_size(size: u32) -> Self {
        match size {
            2 => GridType::Grid2x2,
            3 => GridType::Grid3x3,
            4 => GridType::Grid4x4,
            5 => GridType::Grid5x5,
            _ => GridType::Grid3x3,
        }
    }

    pub fn size(self) -> u32 {
        match self {
            GridType::Grid2x2 => 2,
            GridType::Grid3x3 => 3,
            GridType::Grid4x4 => 4,
            GridType::Grid5x5 => 5,
        }
    }

    /// Number of distinct stimulus values on this grid
    pub fn cells(self) -> u32 {
        self.size() * self.size()
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.size(), self.size())
    }
}

impl FromStr for GridType {
    type Err = SettingsError;

    /// Accepts `"3x3"` and the older `"Grid_3x3"` spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("Grid_").unwrap_or(s);
        GridType::ALL
            .into_iter()
            .find(|grid| grid.to_string() == name)
            .ok_or_else(|| SettingsError::UnknownGrid(s.to_string()))
    }
}

/// Rejected setting change
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("N-Back must be between 1 and 50, got {0}")]
    NBackOutOfRange(u32),

    #[error("Criteria: N-Back < Number of Events")]
    NBackNotBelowEvents,

    #[error("Number of events must be between 1 and 100, got {0}")]
    EventsOutOfRange(u32),

    #[error("Criteria: Number of Events > N-Back")]
    EventsNotAboveNBack,

    #[error("Event interval must be between 500 and 10000 ms, got {0}")]
    IntervalOutOfRange(u64),

    #[error("Criteria: EventInterval > BlinkDuration")]
    IntervalBelowBlink,

    #[error("Blink duration must be between 100 and 10000 ms, got {0}")]
    BlinkOutOfRange(u64),

    #[error("Criteria: BlinkDuration < EventInterval")]
    BlinkAboveInterval,

    #[error("unknown grid type {0:?}")]
    UnknownGrid(String),
}

/// Player-tunable game settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub n_back: u32,
    pub grid: GridType,
    pub number_of_events: u32,
    pub event_interval_ms: u64,
    pub blink_duration_ms: u64,
    pub compact_grid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            n_back: 1,
            grid: GridType::Grid3x3,
            number_of_events: 10,
            event_interval_ms: 2000,
            blink_duration_ms: 1000,
            compact_grid: false,
        }
    }
}

impl Settings {
    pub fn set_n_back(&mut self, value: u32) -> Result<(), SettingsError> {
        if !(MIN_N_BACK..=MAX_N_BACK).contains(&value) {
            return Err(SettingsError::NBackOutOfRange(value));
        }
        if value >= self.number_of_events {
            return Err(SettingsError::NBackNotBelowEvents);
        }
        self.n_back = value;
        Ok(())
    }

    pub fn set_number_of_events(&mut self, value: u32) -> Result<(), SettingsError> {
        if !(MIN_EVENTS..=MAX_EVENTS).contains(&value) {
            return Err(SettingsError::EventsOutOfRange(value));
        }
        if value <= self.n_back {
            return Err(SettingsError::EventsNotAboveNBack);
        }
        self.number_of_events = value;
        Ok(())
    }

    pub fn set_event_interval(&mut self, value_ms: u64) -> Result<(), SettingsError> {
        if !(MIN_INTERVAL_MS..=MAX_TIMING_MS).contains(&value_ms) {
            return Err(SettingsError::IntervalOutOfRange(value_ms));
        }
        if value_ms < self.blink_duration_ms {
            return Err(SettingsError::IntervalBelowBlink);
        }
        self.event_interval_ms = value_ms;
        Ok(())
    }

    pub fn set_blink_duration(&mut self, value_ms: u64) -> Result<(), SettingsError> {
        if !(MIN_BLINK_MS..=MAX_TIMING_MS).contains(&value_ms) {
            return Err(SettingsError::BlinkOutOfRange(value_ms));
        }
        if value_ms > self.event_interval_ms {
            return Err(SettingsError::BlinkAboveInterval);
        }
        self.blink_duration_ms = value_ms;
        Ok(())
    }

    /// Check cross-field rules on values loaded from storage
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_N_BACK..=MAX_N_BACK).contains(&self.n_back) {
            return Err(SettingsError::NBackOutOfRange(self.n_back));
        }
        if !(MIN_EVENTS..=MAX_EVENTS).contains(&self.number_of_events) {
            return Err(SettingsError::EventsOutOfRange(self.number_of_events));
        }
        if self.n_back >= self.number_of_events {
            return Err(SettingsError::NBackNotBelowEvents);
        }
        if !(MIN_INTERVAL_MS..=MAX_TIMING_MS).contains(&self.event_interval_ms) {
            return Err(SettingsError::IntervalOutOfRange(self.event_interval_ms));
        }
        if !(MIN_BLINK_MS..=MAX_TIMING_MS).contains(&self.blink_duration_ms) {
            return Err(SettingsError::BlinkOutOfRange(self.blink_duration_ms));
        }
        if self.blink_duration_ms > self.event_interval_ms {
            return Err(SettingsError::BlinkAboveInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn test_n_back_must_stay_below_events() {
        let mut settings = Settings::default();
        assert_eq!(settings.set_n_back(10), Err(SettingsError::NBackNotBelowEvents));
        assert_eq!(settings.set_n_back(9), Ok(()));
        assert_eq!(
            settings.set_number_of_events(9),
            Err(SettingsError::EventsNotAboveNBack)
        );
        assert_eq!(settings.n_back, 9);
        assert_eq!(settings.number_of_events, 10);
    }

    #[test]
    fn test_blink_never_exceeds_interval() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.set_blink_duration(2500),
            Err(SettingsError::BlinkAboveInterval)
        );
        assert_eq!(
            settings.set_event_interval(900),
            Err(SettingsError::IntervalBelowBlink)
        );
        // equal is allowed in both directions
        assert_eq!(settings.set_blink_duration(2000), Ok(()));
        assert_eq!(settings.set_event_interval(2000), Ok(()));
    }

    #[test]
    fn test_grid_round_trips_through_string() {
        assert_eq!("4x4".parse::<GridType>(), Ok(GridType::Grid4x4));
        assert_eq!(GridType::Grid5x5.to_string(), "5x5");
        assert!("7x7".parse::<GridType>().is_err());
        assert_eq!("Grid_2x2".parse::<GridType>(), Ok(GridType::Grid2x2));
        assert!("Grid_".parse::<GridType>().is_err());
        assert_eq!(GridType::from_size(9), GridType::Grid3x3);
        assert_eq!(GridType::Grid5x5.cells(), 25);
    }

    #[test]
    fn test_game_type_modalities() {
        assert!(GameType::Visual.has(Modality::Position));
        assert!(!GameType::Visual.has(Modality::Audio));
        assert_eq!(GameType::AudioVisual.modalities().len(), 2);
    }
}
