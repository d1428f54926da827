//! BLOCKFALL - a falling-block puzzle game for the terminal

mod game;
mod input;
mod piece;
mod queue;
mod score;
mod settings;
mod stage;
mod tetromino;
mod ui;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use game::{Engine, GameState};
use input::{InputEvent, InputHandler};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::Duration,
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "blockfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Writes the default settings file on first run
    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if let Ok(final_score) = &result {
        println!("\nThanks for playing BLOCKFALL!");
        if let Some(score) = final_score {
            println!("Final score: {}", score);
        }
    }

    result.map(|_| ())
}

/// Run the frame loop until the player quits.
/// Returns the last score, if a game was played.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> io::Result<Option<u32>> {
    let mut engine = Engine::new();
    let mut input = InputHandler::from_settings(settings);

    loop {
        let snapshot = engine.snapshot();
        terminal.draw(|frame| ui::render_game(frame, &snapshot, settings))?;

        // Handle input
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    for event in input.key_down(key) {
                        match event {
                            InputEvent::Game(command) => engine.handle(command),
                            InputEvent::Quit => {
                                let snapshot = engine.snapshot();
                                let played = snapshot.state != GameState::Idle;
                                return Ok(played.then_some(snapshot.score));
                            }
                        }
                    }
                } else if key.kind == KeyEventKind::Release {
                    input.key_up(key);
                }
            }
        }

        // Process held keys for DAS/ARR
        for command in input.update() {
            engine.handle(command);
        }

        // Automatic drop when the timer fires
        engine.tick();
    }
}
