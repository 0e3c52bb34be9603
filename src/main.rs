//! N-Back Trainer - terminal working-memory drills
//!
//! Single-process, single-threaded CLI application. The event loop polls
//! the keyboard every 50ms and advances the game clock in between.

use clap::Parser;
use nback_trainer::cli::{App, Display, InputHandler};
use nback_trainer::prefs::JsonFileRepository;
use nback_trainer::{logging, speech, GameController};
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "nback")]
#[command(about = "Audio/visual N-back working-memory trainer")]
struct Args {
    /// Preference file (settings and highscore)
    #[arg(short, long, env = "NBACK_PREFS", default_value = "nback_prefs.json")]
    prefs: PathBuf,

    /// Log file
    #[arg(long, env = "NBACK_LOG_FILE", default_value = "nback.log")]
    log_file: PathBuf,

    /// Command used to speak letters, e.g. "espeak" or "say"
    #[arg(long, env = "NBACK_SPEECH")]
    speech_command: Option<String>,

    /// Seed for reproducible sequences
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let repo = JsonFileRepository::open(&args.prefs);
    let speaker = speech::from_config(args.speech_command.as_deref());
    let mut game = GameController::new(repo, speaker, args.seed);
    let mut app = App::new();

    InputHandler::enable_raw_mode()?;
    let mut display = Display::fullscreen()?;
    let input = InputHandler::new();

    display.render(&app, &game)?;

    // Event loop
    while !app.should_quit {
        let mut dirty = false;

        if let Some(key) = input.read_key()? {
            app.handle_key(&key, &mut game, Instant::now());
            dirty = true;
        }

        if !game.tick(Instant::now()).is_empty() {
            dirty = true;
        }

        if dirty && !app.should_quit {
            display.render(&app, &game)?;
        }
    }

    game.shutdown();
    display.shutdown()?;

    println!("High-Score: {}%", game.highscore());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Err(e) = logging::init(&args.log_file, args.debug) {
        eprintln!("⚠ Logging disabled: {}", e);
    }
    info!(prefs = %args.prefs.display(), "starting");

    let result = run(&args);
    if let Err(e) = &result {
        let _ = InputHandler::disable_raw_mode();
        error!(error = %e, "exited with error");
    }
    result
}
