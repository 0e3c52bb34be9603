//! Game session state machine
//!
//! Maintains:
//! - The generated stimulus streams and the current event index
//! - Blink/interval timing, advanced explicitly through `tick`
//! - Score and one registered response per modality per event

use super::scoring::{self, ResponseTally};
use super::sequence::{self, MATCH_PERCENT};
use crate::prefs::{GameType, Modality, Settings};
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Fixed parameters of one game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub game_type: GameType,
    pub n_back: u32,
    pub number_of_events: u32,
    /// Distinct stimulus values (grid cells)
    pub combinations: u32,
    pub blink: Duration,
    pub interval: Duration,
}

impl SessionConfig {
    pub fn from_settings(game_type: GameType, settings: &Settings) -> Self {
        SessionConfig {
            game_type,
            n_back: settings.n_back,
            number_of_events: settings.number_of_events,
            combinations: settings.grid.cells(),
            blink: Duration::from_millis(settings.blink_duration_ms),
            interval: Duration::from_millis(settings.event_interval_ms),
        }
    }
}

/// Values presented during one event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stimulus {
    /// 1-based grid cell
    pub position: Option<u32>,
    /// 1-based letter value
    pub letter: Option<u32>,
}

/// Snapshot handed to the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub game_type: GameType,
    pub is_running: bool,
    /// `None` while the stimulus is hidden
    pub event_value: Option<Stimulus>,
    pub event_index: usize,
}

/// Transition reported by `tick`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    StimulusShown { index: usize, stimulus: Stimulus },
    StimulusHidden { index: usize },
    EventClosed { index: usize },
    Finished { score: i32 },
}

#[derive(Clone, Copy, Debug)]
struct Clock {
    shown_at: Instant,
    hidden: bool,
}

/// One N-back game from start to finish
#[derive(Clone, Debug)]
pub struct GameSession {
    config: SessionConfig,
    positions: Vec<u32>,
    letters: Vec<u32>,
    state: GameState,
    score: i32,
    responded: [bool; 2],
    tallies: [ResponseTally; 2],
    clock: Option<Clock>,
}

impl GameSession {
    /// Build a session with freshly generated streams for each active modality
    pub fn generate<R: Rng + ?Sized>(config: SessionConfig, rng: &mut R) -> Self {
        let mut stream = || {
            sequence::generate(
                config.number_of_events,
                config.combinations,
                MATCH_PERCENT,
                config.n_back,
                &mut *rng,
            )
        };
        let positions = if config.game_type.has(Modality::Position) {
            stream()
        } else {
            Vec::new()
        };
        let letters = if config.game_type.has(Modality::Audio) {
            stream()
        } else {
            Vec::new()
        };
        Self::from_sequences(config, positions, letters)
    }

    /// Build a session over given streams; an inactive modality's stream is ignored
    pub fn from_sequences(config: SessionConfig, positions: Vec<u32>, letters: Vec<u32>) -> Self {
        let positions = if config.game_type.has(Modality::Position) {
            positions
        } else {
            Vec::new()
        };
        let letters = if config.game_type.has(Modality::Audio) {
            letters
        } else {
            Vec::new()
        };
        GameSession {
            config,
            positions,
            letters,
            state: GameState {
                game_type: config.game_type,
                is_running: false,
                event_value: None,
                event_index: 0,
            },
            score: 0,
            responded: [false; 2],
            tallies: [ResponseTally::default(); 2],
            clock: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn len(&self) -> usize {
        self.positions.len().max(self.letters.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stream presented for a modality (empty when inactive)
    pub fn sequence(&self, modality: Modality) -> &[u32] {
        match modality {
            Modality::Position => &self.positions,
            Modality::Audio => &self.letters,
        }
    }

    pub fn tally(&self, modality: Modality) -> ResponseTally {
        self.tallies[modality.slot()]
    }

    pub fn has_responded(&self, modality: Modality) -> bool {
        self.responded[modality.slot()]
    }

    /// Fraction of events already completed
    pub fn progress(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.state.event_index as f32 / self.len() as f32
        }
    }

    pub fn success_rate(&self) -> i32 {
        scoring::success_rate(
            self.score,
            self.config.number_of_events,
            self.config.game_type.modalities().len(),
        )
    }

    fn stimulus_at(&self, index: usize) -> Stimulus {
        Stimulus {
            position: self.positions.get(index).copied(),
            letter: self.letters.get(index).copied(),
        }
    }

    /// Begin presenting; event 0 is shown at `now`
    pub fn start(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.score = 0;
        self.responded = [false; 2];
        self.tallies = [ResponseTally::default(); 2];
        self.state.event_index = 0;

        if self.is_empty() {
            self.state.is_running = false;
            self.state.event_value = None;
            self.clock = None;
            return vec![SessionEvent::Finished { score: 0 }];
        }

        let stimulus = self.stimulus_at(0);
        self.state.is_running = true;
        self.state.event_value = Some(stimulus);
        self.clock = Some(Clock {
            shown_at: now,
            hidden: false,
        });
        info!(
            game_type = ?self.config.game_type,
            n_back = self.config.n_back,
            events = self.len(),
            "session started"
        );
        debug!(positions = ?self.positions, letters = ?self.letters, "generated sequence");
        vec![SessionEvent::StimulusShown { index: 0, stimulus }]
    }

    /// Cancel the session and clear all progress
    pub fn stop(&mut self) {
        self.clock = None;
        self.score = 0;
        self.responded = [false; 2];
        self.state.is_running = false;
        self.state.event_value = None;
        self.state.event_index = 0;
    }

    /// Advance timing to `now`, reporting every transition crossed
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Some(clock) = self.clock {
            let index = self.state.event_index;

            if !clock.hidden {
                if now < clock.shown_at + self.config.blink {
                    break;
                }
                self.state.event_value = None;
                self.clock = Some(Clock {
                    hidden: true,
                    ..clock
                });
                events.push(SessionEvent::StimulusHidden { index });
                continue;
            }

            let next_at = clock.shown_at + self.config.interval;
            if now < next_at {
                break;
            }

            self.close_event();
            events.push(SessionEvent::EventClosed { index });

            let next = index + 1;
            self.state.event_index = next;
            if next >= self.len() {
                self.clock = None;
                self.state.is_running = false;
                info!(score = self.score, rate = self.success_rate(), "session finished");
                events.push(SessionEvent::Finished { score: self.score });
                break;
            }

            let stimulus = self.stimulus_at(next);
            self.state.event_value = Some(stimulus);
            self.clock = Some(Clock {
                shown_at: next_at,
                hidden: false,
            });
            events.push(SessionEvent::StimulusShown {
                index: next,
                stimulus,
            });
        }

        events
    }

    fn close_event(&mut self) {
        for &modality in self.config.game_type.modalities() {
            if !self.responded[modality.slot()] && self.is_match(modality) {
                self.tallies[modality.slot()].record_miss();
            }
        }
        self.responded = [false; 2];
    }

    /// Whether the current event repeats the value `n_back` events earlier
    pub fn is_match(&self, modality: Modality) -> bool {
        if !self.state.is_running {
            return false;
        }
        let index = self.state.event_index;
        let n = self.config.n_back as usize;
        if index < n {
            return false;
        }
        let stream = self.sequence(modality);
        match (stream.get(index), stream.get(index - n)) {
            (Some(current), Some(back)) => current == back,
            _ => false,
        }
    }

    /// Register a match claim. Returns whether it was correct, or `None`
    /// if the claim was ignored.
    pub fn respond(&mut self, modality: Modality) -> Option<bool> {
        if !self.state.is_running || !self.config.game_type.has(modality) {
            return None;
        }
        let slot = modality.slot();
        if self.responded[slot] {
            return None;
        }
        self.responded[slot] = true;

        let correct = self.is_match(modality);
        self.score += if correct { 1 } else { -1 };
        self.tallies[slot].record_response(correct);
        debug!(
            index = self.state.event_index,
            ?modality,
            correct,
            score = self.score,
            "response registered"
        );
        Some(correct)
    }
}
