//! Tracing subscriber setup
//!
//! The terminal is owned by the game screen, so log output goes to a file.

use crate::error::{NBackError, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "NBACK_LOG";

/// Filter used when `NBACK_LOG` is unset
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "nback_trainer=debug,nback=debug"
    } else {
        "nback_trainer=info,nback=info"
    }
}

/// Install a global subscriber appending to `path`
pub fn init(path: &Path, debug: bool) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| NBackError::Logging(e.to_string()))
}
