//! N-Back Trainer - working-memory drills in the terminal
//!
//! Presents a sequence of grid positions and/or spoken letters; the player
//! signals whenever the current stimulus matches the one N steps back.

pub mod cli;
pub mod error;
pub mod game;
pub mod logging;
pub mod prefs;
pub mod session;
pub mod speech;

pub use error::{NBackError, Result};
pub use game::{GameController, GameResult};
