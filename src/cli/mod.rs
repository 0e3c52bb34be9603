//! CLI Interface: User input, screen flow and terminal rendering
//!
//! # Components
//! - `input.rs`: Keystroke capture using crossterm
//! - `app.rs`: Screen state machine (home, game, settings)
//! - `display.rs`: Terminal rendering and UI

pub mod app;
pub mod display;
pub mod input;

pub use app::{App, Screen};
pub use display::Display;
pub use input::InputHandler;
