#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use blockfall::{DemoPilot, Field, GameEngine, GameSettings, PilotConfig};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
#[cfg(not(target_arch = "wasm32"))]
use tracing::{debug, info};
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::EnvFilter;

/// Runs a headless autoplay session and prints where it ended up.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug, Clone)]
struct Opts {
    /// Seed for the piece bag; omit for a random one
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file with game settings; missing keys use defaults
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Pieces dealt before the bag takes over, e.g. "i,t,o"
    #[arg(long, value_delimiter = ',')]
    pieces: Vec<String>,
    /// Text file with a starting field, top row first ('.' is empty)
    #[arg(long)]
    field: Option<PathBuf>,
    /// Frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,
    /// Milliseconds per frame
    #[arg(long, default_value_t = 16.0)]
    dt: f32,
    /// Pilot speed in pieces per second
    #[arg(long, default_value_t = 2.0)]
    pps: f32,
    /// Print the final frame as JSON instead of ASCII
    #[arg(long)]
    json: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = match opts.settings.as_deref() {
        Some(path) => load_settings(path)?,
        None => GameSettings::default(),
    };
    let mut engine = GameEngine::new(settings, opts.seed)?;
    if !opts.pieces.is_empty() {
        engine.setup_demo(opts.pieces.as_slice())?;
    }
    if let Some(path) = opts.field.as_deref() {
        engine.load_field(load_field(path)?)?;
    }

    let mut pilot = DemoPilot::new(PilotConfig { pps: opts.pps });
    let mut pieces = 0u32;
    for frame in 0..opts.frames {
        let input = pilot.update(&engine, opts.dt);
        let events = engine.update(opts.dt, input);
        if events.locked {
            pieces += 1;
        }
        if events.lines_cleared > 0 {
            debug!(frame, lines = events.lines_cleared, "clear");
        }
        if engine.is_game_over() {
            break;
        }
    }
    info!(
        pieces,
        score = engine.score(),
        level = engine.level(),
        "run finished"
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    } else {
        print!("{}", engine.field().to_ascii());
        println!(
            "score {}  level {}  lines {}  state {:?}",
            engine.score(),
            engine.level(),
            engine.total_lines(),
            engine.state()
        );
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &Path) -> anyhow::Result<GameSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_field(path: &Path) -> anyhow::Result<Field> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading field from {}", path.display()))?;
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    Ok(Field::from_rows(&rows)?)
}
