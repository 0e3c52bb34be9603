//! Letter announcement for the audio stream
//!
//! Speech is delegated to an external program (`espeak`, `say`, ...).
//! Without one, letters are shown on screen instead.

use std::process::{Child, Command, Stdio};
use tracing::{debug, warn};

/// Letter spoken for a 1-based stimulus value (1 -> 'A')
pub fn letter_for(value: u32) -> char {
    char::from_u32('A' as u32 + value.saturating_sub(1)).unwrap_or('?')
}

/// Something that can say a short piece of text
pub trait Speaker {
    fn speak(&mut self, text: &str);

    /// Whether output is actually audible
    fn is_audible(&self) -> bool;

    fn shutdown(&mut self) {}
}

/// Speaker that says nothing
#[derive(Debug, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, text: &str) {
        debug!(text, "silent speaker");
    }

    fn is_audible(&self) -> bool {
        false
    }
}

/// Speaks by running an external command with the text as last argument
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandSpeaker {
    /// Parse a command line such as `"espeak -s 160"`; `None` if blank
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(CommandSpeaker {
            program,
            args: parts.collect(),
            current: None,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Kill a still-running utterance so the newest one wins
    fn flush(&mut self) {
        if let Some(mut child) = self.current.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) {
        self.flush();
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.current = Some(child),
            Err(e) => warn!(program = %self.program, error = %e, "speech command failed"),
        }
    }

    fn is_audible(&self) -> bool {
        true
    }

    fn shutdown(&mut self) {
        self.flush();
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Speaker for an optional configured command
pub fn from_config(command: Option<&str>) -> Box<dyn Speaker> {
    match command.and_then(CommandSpeaker::from_command_line) {
        Some(speaker) => Box::new(speaker),
        None => Box::new(SilentSpeaker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_mapping() {
        assert_eq!(letter_for(1), 'A');
        assert_eq!(letter_for(9), 'I');
        assert_eq!(letter_for(25), 'Y');
    }

    #[test]
    fn test_command_line_parsing() {
        let speaker = CommandSpeaker::from_command_line("espeak -s 160").unwrap();
        assert_eq!(speaker.program(), "espeak");
        assert_eq!(speaker.args(), ["-s", "160"]);
        assert!(CommandSpeaker::from_command_line("   ").is_none());
    }

    #[test]
    fn test_missing_program_is_not_fatal() {
        let mut speaker =
            CommandSpeaker::from_command_line("nback-test-no-such-program-xyz").unwrap();
        speaker.speak("A");
        speaker.shutdown();
    }

    #[cfg(unix)]
    #[test]
    fn test_new_utterance_cuts_off_previous() {
        use std::time::{Duration, Instant};

        let started = Instant::now();
        let mut speaker = CommandSpeaker::from_command_line("sleep").unwrap();
        speaker.speak("30");
        speaker.speak("30");
        speaker.shutdown();
        assert!(speaker.current.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_config_without_command_is_silent() {
        assert!(!from_config(None).is_audible());
        assert!(!from_config(Some("")).is_audible());
        assert!(from_config(Some("say")).is_audible());
    }
}
