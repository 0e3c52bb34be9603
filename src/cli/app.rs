//! Screen navigation and key handling
//!
//! Pure state machine: keys in, controller calls and screen changes out.
//! Rendering lives in `display.rs`.

use super::input::InputHandler;
use crate::game::GameController;
use crate::prefs::{GameType, GridType, PreferencesRepository, SettingsError};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;
use tracing::warn;

/// Step applied to timing settings per arrow press (ms)
const TIMING_STEP_MS: u64 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Game,
    Settings,
}

/// Row on the settings screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    NBack,
    Grid,
    NumberOfEvents,
    EventInterval,
    BlinkDuration,
    CompactGrid,
}

impl SettingsField {
    pub const ALL: [SettingsField; 6] = [
        SettingsField::NBack,
        SettingsField::Grid,
        SettingsField::NumberOfEvents,
        SettingsField::EventInterval,
        SettingsField::BlinkDuration,
        SettingsField::CompactGrid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::NBack => "N-Back Value",
            SettingsField::Grid => "Grid Type",
            SettingsField::NumberOfEvents => "Number Of Events",
            SettingsField::EventInterval => "Event Interval [s]",
            SettingsField::BlinkDuration => "Blink Duration [s]",
            SettingsField::CompactGrid => "Compact Grid",
        }
    }
}

/// Transient status line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub is_error: bool,
}

impl Message {
    fn info(text: impl Into<String>) -> Self {
        Message {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Message {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Terminal application state
#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub selected: usize,
    pub message: Option<Message>,
    /// Start/reset toggle on the game screen
    pub game_started: bool,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        App {
            screen: Screen::Home,
            selected: 0,
            message: None,
            game_started: false,
            should_quit: false,
        }
    }

    pub fn selected_field(&self) -> SettingsField {
        SettingsField::ALL[self.selected % SettingsField::ALL.len()]
    }

    pub fn handle_key<R: PreferencesRepository>(
        &mut self,
        key: &KeyEvent,
        game: &mut GameController<R>,
        now: Instant,
    ) {
        if InputHandler::is_exit(key) {
            game.stop_game();
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Home => self.handle_home(key, game),
            Screen::Game => self.handle_game(key, game, now),
            Screen::Settings => self.handle_settings(key, game),
        }
    }

    fn handle_home<R: PreferencesRepository>(
        &mut self,
        key: &KeyEvent,
        game: &mut GameController<R>,
    ) {
        if InputHandler::is_escape(key) {
            self.should_quit = true;
            return;
        }
        let game_type = match InputHandler::key_to_char(key) {
            Some('a') => GameType::Audio,
            Some('v') => GameType::Visual,
            Some('b') => GameType::AudioVisual,
            Some('s') => {
                self.message = None;
                self.selected = 0;
                self.screen = Screen::Settings;
                return;
            }
            Some('q') => {
                self.should_quit = true;
                return;
            }
            _ => return,
        };
        game.set_game_type(game_type);
        self.game_started = false;
        self.message = None;
        self.screen = Screen::Game;
    }

    fn handle_game<R: PreferencesRepository>(
        &mut self,
        key: &KeyEvent,
        game: &mut GameController<R>,
        now: Instant,
    ) {
        if InputHandler::is_escape(key) {
            game.stop_game();
            self.game_started = false;
            self.message = None;
            self.screen = Screen::Home;
            return;
        }
        if InputHandler::is_confirm(key) {
            if self.game_started {
                if !game.is_running() {
                    if let Some(result) = game.last_result() {
                        self.message =
                            Some(Message::info(format!("SuccessRate: {}%", result.success_rate)));
                    }
                } else {
                    self.message = None;
                }
                game.stop_game();
                self.game_started = false;
            } else {
                self.message = None;
                game.start_game(now);
                self.game_started = true;
            }
            return;
        }
        if let Some(modality) = InputHandler::match_modality(key) {
            game.check_match(modality);
        }
    }

    fn handle_settings<R: PreferencesRepository>(
        &mut self,
        key: &KeyEvent,
        game: &mut GameController<R>,
    ) {
        let count = SettingsField::ALL.len();
        match key.code {
            KeyCode::Esc => {
                game.discard_changes();
                self.message = None;
                self.screen = Screen::Home;
            }
            KeyCode::Enter => match game.save_preferences() {
                Ok(()) => {
                    self.message = Some(Message::info("Settings saved"));
                    self.screen = Screen::Home;
                }
                Err(e) => {
                    warn!(error = %e, "saving preferences failed");
                    self.message = Some(Message::error(format!("Could not save: {e}")));
                }
            },
            KeyCode::Up => self.selected = (self.selected + count - 1) % count,
            KeyCode::Down => self.selected = (self.selected + 1) % count,
            KeyCode::Left => self.adjust(game, -1),
            KeyCode::Right => self.adjust(game, 1),
            _ => match InputHandler::key_to_char(key) {
                Some('c') => {
                    let compact = !game.settings().compact_grid;
                    game.set_compact_grid(compact);
                }
                Some('d') => {
                    game.reset_to_defaults();
                    self.message = Some(Message::info("Defaults restored (Enter to save)"));
                }
                _ => {}
            },
        }
    }

    fn adjust<R: PreferencesRepository>(&mut self, game: &mut GameController<R>, step: i64) {
        let settings = game.settings().clone();
        let result: Result<(), SettingsError> = match self.selected_field() {
            SettingsField::NBack => game.set_n_back(offset(settings.n_back as u64, step) as u32),
            SettingsField::Grid => {
                let size = offset(settings.grid.size() as u64, step).clamp(2, 5);
                game.set_grid(GridType::from_size(size as u32));
                Ok(())
            }
            SettingsField::NumberOfEvents => {
                game.set_number_of_events(offset(settings.number_of_events as u64, step) as u32)
            }
            SettingsField::EventInterval => game.set_event_interval(offset(
                settings.event_interval_ms,
                step * TIMING_STEP_MS as i64,
            )),
            SettingsField::BlinkDuration => game.set_blink_duration(offset(
                settings.blink_duration_ms,
                step * TIMING_STEP_MS as i64,
            )),
            SettingsField::CompactGrid => {
                game.set_compact_grid(!settings.compact_grid);
                Ok(())
            }
        };
        self.message = result.err().map(|e| Message::error(e.to_string()));
    }
}

fn offset(value: u64, step: i64) -> u64 {
    value.saturating_add_signed(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{MemoryRepository, Modality};
    use crate::speech::SilentSpeaker;
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> (App, GameController<MemoryRepository>) {
        (
            App::new(),
            GameController::new(MemoryRepository::new(), Box::new(SilentSpeaker), Some(9)),
        )
    }

    #[test]
    fn test_home_picks_game_type() {
        let (mut app, mut game) = setup();
        app.handle_key(&key(KeyCode::Char('b')), &mut game, Instant::now());
        assert_eq!(app.screen, Screen::Game);
        assert_eq!(game.game_type(), GameType::AudioVisual);
    }

    #[test]
    fn test_start_and_reset_toggle() {
        let (mut app, mut game) = setup();
        let t0 = Instant::now();
        app.handle_key(&key(KeyCode::Char('v')), &mut game, t0);
        app.handle_key(&key(KeyCode::Char(' ')), &mut game, t0);
        assert!(game.is_running());

        app.handle_key(&key(KeyCode::Char('f')), &mut game, t0);
        assert!(game.has_responded(Modality::Position));

        app.handle_key(&key(KeyCode::Enter), &mut game, t0);
        assert!(!game.is_running());
        assert!(!app.game_started);
        assert_eq!(app.message, None);
    }

    #[test]
    fn test_reset_after_finish_reports_success_rate() {
        let (mut app, mut game) = setup();
        let t0 = Instant::now();
        app.handle_key(&key(KeyCode::Char('v')), &mut game, t0);
        app.handle_key(&key(KeyCode::Enter), &mut game, t0);
        game.tick(t0 + Duration::from_secs(600));

        app.handle_key(&key(KeyCode::Enter), &mut game, t0);
        assert_eq!(
            app.message,
            Some(Message::info("SuccessRate: 0%"))
        );
    }

    #[test]
    fn test_settings_validation_message() {
        let (mut app, mut game) = setup();
        let now = Instant::now();
        app.handle_key(&key(KeyCode::Char('s')), &mut game, now);
        assert_eq!(app.screen, Screen::Settings);

        // blink duration row; raising it past the interval is rejected
        for _ in 0..4 {
            app.handle_key(&key(KeyCode::Down), &mut game, now);
        }
        assert_eq!(app.selected_field(), SettingsField::BlinkDuration);
        for _ in 0..4 {
            app.handle_key(&key(KeyCode::Right), &mut game, now);
        }
        assert_eq!(game.settings().blink_duration_ms, 2000);
        app.handle_key(&key(KeyCode::Right), &mut game, now);
        assert_eq!(game.settings().blink_duration_ms, 2000);
        assert!(app.message.as_ref().is_some_and(|m| m.is_error));
    }

    #[test]
    fn test_settings_escape_discards_and_enter_saves() {
        let (mut app, mut game) = setup();
        let now = Instant::now();
        app.handle_key(&key(KeyCode::Char('s')), &mut game, now);
        app.handle_key(&key(KeyCode::Down), &mut game, now);
        app.handle_key(&key(KeyCode::Right), &mut game, now);
        assert_eq!(game.settings().grid, GridType::Grid4x4);
        app.handle_key(&key(KeyCode::Esc), &mut game, now);
        assert_eq!(game.settings().grid, GridType::Grid3x3);
        assert_eq!(app.screen, Screen::Home);

        app.handle_key(&key(KeyCode::Char('s')), &mut game, now);
        app.handle_key(&key(KeyCode::Right), &mut game, now);
        app.handle_key(&key(KeyCode::Enter), &mut game, now);
        assert_eq!(game.repository().n_back(), 2);
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_screen() {
        let (mut app, mut game) = setup();
        let now = Instant::now();
        app.handle_key(&key(KeyCode::Char('v')), &mut game, now);
        app.handle_key(&key(KeyCode::Enter), &mut game, now);
        app.handle_key(
            &KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut game,
            now,
        );
        assert!(app.should_quit);
        assert!(!game.is_running());
    }
}
