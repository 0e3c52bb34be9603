//! Session: sequence generation, timed presentation and scoring
//!
//! # Components
//! - `sequence.rs`: N-back stimulus sequence generator
//! - `state.rs`: GameSession state machine driven by `tick`
//! - `scoring.rs`: Success rate and per-modality response tallies

pub mod scoring;
pub mod sequence;
pub mod state;

pub use scoring::{success_rate, ResponseTally};
pub use state::{GameSession, GameState, SessionConfig, SessionEvent, Stimulus};
