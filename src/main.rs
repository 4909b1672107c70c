//! Backbeat: Play a style over a chord progression and log every trigger.
//!
//! No audio is produced: each trigger request is printed through `tracing`
//! with its target time, which makes the scheduler's behaviour visible.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use backbeat::pattern::{Arrangement, ChordProgression, StyleBook};
use backbeat::playback::{ConsoleTrigger, TransportController};
use backbeat::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "backbeat")]
#[command(about = "Real-time accompaniment from a style and a chord progression", long_about = None)]
struct Cli {
    /// Style name
    #[arg(short, long, default_value = "rock")]
    style: String,

    /// Chord progression, one chord per bar ("C Am F G")
    #[arg(short, long, default_value = "C Am F G")]
    chords: String,

    /// Tempo in BPM (defaults to the middle of the style's tempo range)
    #[arg(short, long)]
    tempo: Option<f64>,

    /// Loop length in bars (defaults to one bar per chord)
    #[arg(short, long)]
    bars: Option<u32>,

    /// Intensity 0..1
    #[arg(short, long)]
    intensity: Option<f64>,

    /// Swing 0..0.9 (defaults to the style's swing)
    #[arg(long)]
    swing: Option<f64>,

    /// Humanization in beats; 0 disables it
    #[arg(long, default_value = "0")]
    humanize: f64,

    /// Seconds to play before stopping
    #[arg(long, default_value = "8.0")]
    seconds: f64,

    /// Extra styles file (YAML list), merged over the built-ins
    #[arg(long)]
    styles_file: Option<PathBuf>,

    /// List available styles and exit
    #[arg(long)]
    list_styles: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("backbeat=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load();

    let mut book = StyleBook::builtin()?;
    if let Some(path) = &cli.styles_file {
        book.extend(StyleBook::load_file(path)?);
    }
    if cli.list_styles {
        for name in book.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let style = book.get(&cli.style)?.clone();
    let bpm = cli.tempo.unwrap_or_else(|| style.default_tempo());
    let mut arrangement = Arrangement::new(style, ChordProgression::parse(&cli.chords));
    if let Some(bars) = cli.bars {
        arrangement = arrangement.with_bars(bars);
    }
    if let Some(swing) = cli.swing {
        arrangement = arrangement.with_swing(swing);
    }

    let mut transport = TransportController::new(arrangement, ConsoleTrigger::new(), &config);
    transport.set_tempo(bpm)?;
    if let Some(level) = cli.intensity {
        transport.set_intensity(level);
    }
    transport.set_humanize(cli.humanize > 0.0, cli.humanize);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    transport.start()?;
    let seconds = if cli.seconds.is_finite() {
        cli.seconds.clamp(0.0, 86_400.0)
    } else {
        0.0
    };
    let deadline = Instant::now() + Duration::from_secs_f64(seconds);
    while Instant::now() < deadline && !interrupted.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(20));
    }
    transport.stop();

    let d = transport.diagnostics();
    println!(
        "triggered {}, dropped late {}, skipped ticks {}, unknown voices {}, chord substitutions {}",
        d.triggered, d.dropped_late, d.skipped_ticks, d.unknown_voices, d.chord_substitutions
    );
    Ok(())
}
