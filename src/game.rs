//! Game controller: settings, highscore and session lifecycle
//!
//! Sits between the terminal UI and the session state machine. Owns the
//! preference repository, so every setting and highscore change that must
//! survive a restart goes through here.

use crate::error::Result;
use crate::prefs::{GameType, GridType, Modality, PreferencesRepository, Settings, SettingsError};
use crate::session::{GameSession, GameState, ResponseTally, SessionConfig, SessionEvent};
use crate::speech::{letter_for, Speaker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a game that ran to the end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub game_type: GameType,
    pub score: i32,
    pub success_rate: i32,
    pub new_highscore: bool,
    pub position: ResponseTally,
    pub audio: ResponseTally,
}

pub struct GameController<R: PreferencesRepository> {
    repo: R,
    speaker: Box<dyn Speaker>,
    rng: StdRng,
    settings: Settings,
    saved_settings: Settings,
    game_type: GameType,
    highscore: i32,
    session: Option<GameSession>,
    last_result: Option<GameResult>,
}

impl<R: PreferencesRepository> GameController<R> {
    /// Load settings and highscore from `repo`. A `seed` makes every
    /// generated sequence reproducible.
    pub fn new(repo: R, speaker: Box<dyn Speaker>, seed: Option<u64>) -> Self {
        let settings = repo.load_settings();
        let highscore = repo.highscore();
        info!(?settings, highscore, "preferences loaded");
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        GameController {
            repo,
            speaker,
            rng,
            saved_settings: settings.clone(),
            settings,
            game_type: GameType::default(),
            highscore,
            session: None,
            last_result: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn highscore(&self) -> i32 {
        self.highscore
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn last_result(&self) -> Option<&GameResult> {
        self.last_result.as_ref()
    }

    pub fn speaker_is_audible(&self) -> bool {
        self.speaker.is_audible()
    }

    pub fn game_state(&self) -> GameState {
        match &self.session {
            Some(session) => session.state(),
            None => GameState {
                game_type: self.game_type,
                is_running: false,
                event_value: None,
                event_index: 0,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_running())
    }

    pub fn set_game_type(&mut self, game_type: GameType) {
        if self.is_running() {
            self.stop_game();
        }
        self.game_type = game_type;
        self.session = None;
        self.last_result = None;
        debug!(?game_type, "changed game type");
    }

    pub fn set_n_back(&mut self, value: u32) -> std::result::Result<(), SettingsError> {
        self.settings.set_n_back(value)?;
        debug!(n_back = value, "changed n-back");
        Ok(())
    }

    pub fn set_number_of_events(&mut self, value: u32) -> std::result::Result<(), SettingsError> {
        self.settings.set_number_of_events(value)?;
        debug!(number_of_events = value, "changed number of events");
        Ok(())
    }

    pub fn set_event_interval(&mut self, value_ms: u64) -> std::result::Result<(), SettingsError> {
        self.settings.set_event_interval(value_ms)?;
        debug!(event_interval_ms = value_ms, "changed event interval");
        Ok(())
    }

    pub fn set_blink_duration(&mut self, value_ms: u64) -> std::result::Result<(), SettingsError> {
        self.settings.set_blink_duration(value_ms)?;
        debug!(blink_duration_ms = value_ms, "changed blink duration");
        Ok(())
    }

    pub fn set_grid(&mut self, grid: GridType) {
        self.settings.grid = grid;
        debug!(%grid, "changed grid");
    }

    pub fn set_compact_grid(&mut self, compact: bool) {
        self.settings.compact_grid = compact;
    }

    pub fn reset_to_defaults(&mut self) {
        self.settings = Settings::default();
    }

    /// Drop unsaved setting changes
    pub fn discard_changes(&mut self) {
        self.settings = self.saved_settings.clone();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.settings != self.saved_settings
    }

    /// Persist all settings. A change to any game-affecting setting makes
    /// old highscores incomparable, so the highscore is reset.
    pub fn save_preferences(&mut self) -> Result<()> {
        let changed = Settings {
            compact_grid: self.saved_settings.compact_grid,
            ..self.settings.clone()
        } != self.saved_settings;
        self.repo.save_settings(&self.settings)?;
        self.saved_settings = self.settings.clone();
        info!(changed, "saved preferences");
        if changed {
            self.reset_highscore()?;
        }
        Ok(())
    }

    pub fn reset_highscore(&mut self) -> Result<()> {
        self.highscore = 0;
        self.repo.save_highscore(0)?;
        Ok(())
    }

    /// Cancel any running game and start a new one at `now`
    pub fn start_game(&mut self, now: Instant) -> Vec<SessionEvent> {
        self.stop_game();
        self.last_result = None;
        let config = SessionConfig::from_settings(self.game_type, &self.settings);
        let mut session = GameSession::generate(config, &mut self.rng);
        let events = session.start(now);
        self.session = Some(session);
        self.dispatch(&events);
        events
    }

    pub fn stop_game(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.is_running() {
                debug!(index = session.state().event_index, "game stopped");
            }
            session.stop();
        }
    }

    /// Advance the running game to `now`
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        let events = match self.session.as_mut() {
            Some(session) => session.tick(now),
            None => Vec::new(),
        };
        self.dispatch(&events);
        events
    }

    fn dispatch(&mut self, events: &[SessionEvent]) {
        for event in events {
            match *event {
                SessionEvent::StimulusShown { stimulus, .. } => {
                    if let Some(letter) = stimulus.letter {
                        self.speaker.speak(&letter_for(letter).to_string());
                    }
                }
                SessionEvent::Finished { .. } => self.finish(),
                SessionEvent::StimulusHidden { .. } | SessionEvent::EventClosed { .. } => {}
            }
        }
    }

    fn finish(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let rate = session.success_rate();
        let new_highscore = rate > self.highscore;
        self.last_result = Some(GameResult {
            game_type: session.config().game_type,
            score: session.score(),
            success_rate: rate,
            new_highscore,
            position: session.tally(Modality::Position),
            audio: session.tally(Modality::Audio),
        });
        if new_highscore {
            info!(previous = self.highscore, highscore = rate, "new highscore");
            self.highscore = rate;
            if let Err(e) = self.repo.save_highscore(rate) {
                warn!(error = %e, "could not persist highscore");
            }
        }
    }

    /// Match button for `modality`; `Some(correct)` when registered
    pub fn check_match(&mut self, modality: Modality) -> Option<bool> {
        self.session.as_mut()?.respond(modality)
    }

    /// Whether the current event is a true match for `modality`
    pub fn check_guess(&self, modality: Modality) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_match(modality))
    }

    pub fn has_responded(&self, modality: Modality) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.has_responded(modality))
    }

    pub fn score(&self) -> i32 {
        self.session.as_ref().map_or(0, |s| s.score())
    }

    pub fn success_rate(&self) -> i32 {
        self.session.as_ref().map_or(0, |s| s.success_rate())
    }

    pub fn shutdown(&mut self) {
        self.stop_game();
        self.speaker.shutdown();
    }
}
