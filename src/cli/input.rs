//! Keystroke input handling using crossterm
//!
//! Features:
//! - Non-blocking keystroke capture, so the game clock keeps ticking
//! - Ctrl+C graceful exit
//! - Match key mapping for both stimulus streams

use crate::prefs::Modality;
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::Result as IoResult;
use std::time::Duration;

/// Key for a position match
pub const POSITION_KEY: char = 'f';
/// Key for a letter match
pub const AUDIO_KEY: char = 'j';

/// Handles user input from terminal
pub struct InputHandler {
    /// Timeout for poll operations
    poll_timeout: Duration,
}

impl InputHandler {
    /// Create new input handler with default timeout (50ms for responsive input)
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(50),
        }
    }

    pub fn enable_raw_mode() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()
    }

    pub fn disable_raw_mode() -> IoResult<()> {
        crossterm::terminal::disable_raw_mode()
    }

    /// Poll for keystroke with timeout (non-blocking)
    /// Returns Some(KeyEvent) if key pressed, None if timeout
    pub fn read_key(&self) -> IoResult<Option<KeyEvent>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                // Windows also reports releases
                event::Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    Ok(Some(key_event))
                }
                _ => Ok(None),
            }
        } else {
            Ok(None)
        }
    }

    /// Check if key event is Ctrl+C
    pub fn is_exit(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL))
    }

    pub fn is_escape(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Esc)
    }

    /// Plain character without Ctrl/Alt, lowercased
    pub fn key_to_char(key: &KeyEvent) -> Option<char> {
        match key.code {
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(c.to_ascii_lowercase())
            }
            _ => None,
        }
    }

    /// Space or Enter
    pub fn is_confirm(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
    }

    /// Stream a match key refers to
    pub fn match_modality(key: &KeyEvent) -> Option<Modality> {
        match Self::key_to_char(key)? {
            POSITION_KEY => Some(Modality::Position),
            AUDIO_KEY => Some(Modality::Audio),
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_match_keys() {
        assert_eq!(
            InputHandler::match_modality(&key(KeyCode::Char('f'))),
            Some(Modality::Position)
        );
        assert_eq!(
            InputHandler::match_modality(&key(KeyCode::Char('J'))),
            Some(Modality::Audio)
        );
        assert_eq!(InputHandler::match_modality(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_exits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(InputHandler::is_exit(&ctrl_c));
        assert!(!InputHandler::is_exit(&key(KeyCode::Char('c'))));
        assert_eq!(InputHandler::key_to_char(&ctrl_c), None);
    }
}
