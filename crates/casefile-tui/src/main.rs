mod app;
mod render;
mod theme;

use anyhow::{Context, Result};
use app::App;
use casefile_core::{InputModality, Session, SessionConfig};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Investigate the evidence, then indict or dismiss the case
#[derive(Debug, Parser)]
#[command(name = "casefile", version, about)]
struct Cli {
    /// Use the longer touch-screen time limit
    #[arg(long)]
    touch: bool,

    /// Seed the puzzle generator
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with session settings (overrides --touch)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn init_tracing(log: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal is in raw mode, so logs only ever go to a file
    if let Some(path) = log {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %path.display(), "logging initialized");
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| path.display().to_string())?;
            SessionConfig::from_json(&json).with_context(|| path.display().to_string())?
        }
        None if cli.touch => SessionConfig::for_modality(InputModality::Touch),
        None => SessionConfig::for_modality(InputModality::Pointer),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    let config = load_config(&cli)?;
    let session = Session::new(config).context("invalid session settings")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Run the app
    let result = run_app(&mut stdout, App::new(session));

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    let app = result?;
    println!(
        "Reached stage {} with score {}",
        app.session.stage(),
        app.session.score()
    );
    Ok(())
}

fn run_app(stdout: &mut io::Stdout, mut app: App) -> io::Result<App> {
    let tick_rate = app.get_tick_rate();
    let mut last_tick = Instant::now();

    loop {
        render::render(stdout, &app)?;
        stdout.flush()?;

        // Handle input with timeout so the countdown keeps moving
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    app::AppAction::Continue => {}
                    app::AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(app)
}
