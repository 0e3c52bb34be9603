//! Terminal display and UI rendering
//!
//! Features:
//! - Home screen with highscore and game type choice
//! - Stimulus grid with blink highlighting
//! - Match feedback coloring and score line
//! - Settings editor

use super::app::{App, Message, Screen, SettingsField};
use super::input::{AUDIO_KEY, POSITION_KEY};
use crate::game::{GameController, GameResult};
use crate::prefs::{GameType, Modality, PreferencesRepository, Settings};
use crate::speech::letter_for;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Result as IoResult, Stdout, Write};

const BLINK_COLOR: Color = Color::Cyan;
const STANDBY_COLOR: Color = Color::DarkBlue;

/// Terminal display manager
pub struct Display {
    out: Stdout,
    /// Whether we're using alternate screen
    use_alternate_screen: bool,
}

impl Display {
    /// Take over the terminal with an alternate screen
    pub fn fullscreen() -> IoResult<Self> {
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        Ok(Display {
            out,
            use_alternate_screen: true,
        })
    }

    /// Draw the whole frame for the current screen
    pub fn render<R: PreferencesRepository>(
        &mut self,
        app: &App,
        game: &GameController<R>,
    ) -> IoResult<()> {
        queue!(self.out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        let next_row = match app.screen {
            Screen::Home => self.draw_home(game)?,
            Screen::Game => self.draw_game(app, game)?,
            Screen::Settings => self.draw_settings(app, game.settings())?,
        };
        if let Some(message) = &app.message {
            self.draw_message(message, next_row + 1)?;
        }
        self.out.flush()
    }

    fn line(&mut self, row: u16, color: Color, text: &str) -> IoResult<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            SetForegroundColor(color),
            Print(text),
            ResetColor
        )
    }

    fn draw_home<R: PreferencesRepository>(&mut self, game: &GameController<R>) -> IoResult<u16> {
        self.line(1, Color::Cyan, "N-Back Trainer")?;
        self.line(3, Color::Yellow, &format!("High-Score = {}%", game.highscore()))?;

        let settings = game.settings();
        self.line(
            5,
            Color::White,
            &format!(
                "N = {}  |  Grid {}  |  {} events  |  interval {:.1}s  |  blink {:.1}s",
                settings.n_back,
                settings.grid,
                settings.number_of_events,
                settings.event_interval_ms as f64 / 1000.0,
                settings.blink_duration_ms as f64 / 1000.0
            ),
        )?;

        self.line(7, Color::Magenta, "[A] Audio   [V] Visual   [B] Audio-Visual")?;
        self.line(8, Color::Magenta, "[S] Settings   [Q] Quit")?;
        Ok(9)
    }

    fn draw_game<R: PreferencesRepository>(
        &mut self,
        app: &App,
        game: &GameController<R>,
    ) -> IoResult<u16> {
        let state = game.game_state();
        let settings = game.settings();
        let total = settings.number_of_events;

        self.line(
            1,
            Color::Cyan,
            &format!("N-Back Trainer  |  {}", state.game_type.label()),
        )?;
        self.line(
            2,
            Color::White,
            &format!(
                "N = {}  |  S = {}  |  Event {}/{}",
                settings.n_back,
                game.score(),
                (state.event_index + 1).min(total as usize),
                total
            ),
        )?;

        let mut row = self.draw_grid(4, game, settings)?;

        if let Some(session) = game.session() {
            row += 1;
            self.line(row, Color::Blue, &progress_bar(session.progress(), 30))?;
        }

        if state.game_type.has(Modality::Audio) {
            let letter = state
                .event_value
                .and_then(|s| s.letter)
                .filter(|_| !game.speaker_is_audible())
                .map(|value| letter_for(value).to_string())
                .unwrap_or_default();
            self.line(row + 1, Color::Yellow, &format!("Letter: {letter}"))?;
            row += 2;
        }

        row += 1;
        queue!(self.out, cursor::MoveTo(0, row))?;
        for &modality in state.game_type.modalities() {
            self.draw_match_button(game, modality)?;
        }
        row += 2;

        let help = if app.game_started {
            "SPACE reset  |  ESC menu  |  Ctrl+C quit"
        } else {
            "SPACE start  |  ESC menu  |  Ctrl+C quit"
        };
        self.line(row, Color::DarkGrey, help)?;

        if let Some(result) = game.last_result() {
            row = self.draw_result(row + 2, result)?;
        }
        Ok(row)
    }

    /// Render the grid; returns the first free row below it
    fn draw_grid<R: PreferencesRepository>(
        &mut self,
        top: u16,
        game: &GameController<R>,
        settings: &Settings,
    ) -> IoResult<u16> {
        let state = game.game_state();
        let size = settings.grid.size();
        let (cell, height) = if settings.compact_grid {
            ("███", 1)
        } else {
            ("██████", 2)
        };
        let lit_position = state.event_value.and_then(|s| s.position);
        // audio-only games flash the whole grid while a letter plays
        let all_lit = state.game_type == GameType::Audio && state.event_value.is_some();

        let mut row = top;
        for r in 0..size {
            for _ in 0..height {
                queue!(self.out, cursor::MoveTo(2, row))?;
                for c in 0..size {
                    let value = r * size + c + 1;
                    let color = if all_lit || lit_position == Some(value) {
                        BLINK_COLOR
                    } else {
                        STANDBY_COLOR
                    };
                    queue!(self.out, SetForegroundColor(color), Print(cell), Print(" "))?;
                }
                queue!(self.out, ResetColor)?;
                row += 1;
            }
            if !settings.compact_grid {
                row += 1;
            }
        }
        Ok(row)
    }

    fn draw_match_button<R: PreferencesRepository>(
        &mut self,
        game: &GameController<R>,
        modality: Modality,
    ) -> IoResult<()> {
        let (key, label) = match modality {
            Modality::Position => (POSITION_KEY, "Position match"),
            Modality::Audio => (AUDIO_KEY, "Letter match"),
        };
        let color = if game.has_responded(modality) {
            if game.check_guess(modality) {
                Color::Green
            } else {
                Color::Red
            }
        } else {
            Color::White
        };
        queue!(
            self.out,
            SetForegroundColor(color),
            Print(format!("[{}] {}    ", key.to_ascii_uppercase(), label)),
            ResetColor
        )
    }

    fn draw_result(&mut self, top: u16, result: &GameResult) -> IoResult<u16> {
        self.line(top, Color::Blue, &"─".repeat(50))?;
        let mut headline = format!(
            "Finished! Score {}  |  SuccessRate {}%",
            result.score, result.success_rate
        );
        if result.new_highscore {
            headline.push_str("  |  New High-Score!");
        }
        self.line(top + 1, Color::Green, &headline)?;

        let mut row = top + 2;
        for &modality in result.game_type.modalities() {
            let (label, tally) = match modality {
                Modality::Position => ("Position", result.position),
                Modality::Audio => ("Letter", result.audio),
            };
            self.line(
                row,
                Color::White,
                &format!(
                    "{label}: {} hits, {} false alarms, {} misses ({:.0}% of matches caught)",
                    tally.hits,
                    tally.false_alarms,
                    tally.misses,
                    tally.hit_ratio() * 100.0
                ),
            )?;
            row += 1;
        }
        Ok(row)
    }

    fn draw_settings(&mut self, app: &App, settings: &Settings) -> IoResult<u16> {
        self.line(1, Color::Cyan, "Game Settings")?;

        let mut row = 3;
        for field in SettingsField::ALL {
            let value = match field {
                SettingsField::NBack => settings.n_back.to_string(),
                SettingsField::Grid => settings.grid.to_string(),
                SettingsField::NumberOfEvents => settings.number_of_events.to_string(),
                SettingsField::EventInterval => {
                    format!("{:.2}", settings.event_interval_ms as f64 / 1000.0)
                }
                SettingsField::BlinkDuration => {
                    format!("{:.2}", settings.blink_duration_ms as f64 / 1000.0)
                }
                SettingsField::CompactGrid => settings.compact_grid.to_string(),
            };
            let selected = field == app.selected_field();
            let (marker, color) = if selected {
                ("> ", Color::Yellow)
            } else {
                ("  ", Color::White)
            };
            self.line(row, color, &format!("{marker}{}: {value}", field.label()))?;
            row += 1;
        }

        row += 1;
        self.line(
            row,
            Color::DarkGrey,
            "UP/DOWN select  |  LEFT/RIGHT change  |  C compact  |  D defaults",
        )?;
        self.line(
            row + 1,
            Color::DarkGrey,
            "ENTER save (changes reset the High-Score)  |  ESC discard",
        )?;
        Ok(row + 2)
    }

    fn draw_message(&mut self, message: &Message, row: u16) -> IoResult<()> {
        let color = if message.is_error { Color::Red } else { Color::Green };
        self.line(row, color, &message.text)
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&mut self) -> IoResult<()> {
        if self.use_alternate_screen {
            execute!(self.out, LeaveAlternateScreen, cursor::Show)?;
            self.use_alternate_screen = false;
        }
        terminal::disable_raw_mode()
    }
}

/// Text bar of `width` cells filled to `fraction`
fn progress_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction.clamp(0.0, 1.0) * 100.0
    )
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_fill() {
        assert_eq!(progress_bar(0.0, 4), "[----]   0%");
        assert_eq!(progress_bar(0.5, 4), "[##--]  50%");
        assert_eq!(progress_bar(1.0, 4), "[####] 100%");
        assert_eq!(progress_bar(1.5, 4), "[####] 100%");
    }
}
