//! Console front-end for the chord practice coach.
//!
//! A thin presentation layer over `coach-core`: it starts a practice
//! session against the requested chord and redraws a one-line accuracy
//! meter from the observer callback. All signal processing lives in the
//! core crate.

use anyhow::Result;
use clap::Parser;
use coach_core::{CaptureError, Observer, Session, SessionConfig, chord};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scores live microphone input against a target chord.
#[derive(Parser)]
#[command(name = "coach", version)]
struct Args {
    /// Target chord name. Unknown names score against C major.
    #[arg(default_value = "C")]
    chord: String,

    /// List the chords the table knows, then exit.
    #[arg(long)]
    list_chords: bool,
}

/// Observer that redraws a single meter line per update.
struct ConsoleMeter;

const METER_WIDTH: usize = 30;

impl Observer for ConsoleMeter {
    fn on_update(&mut self, score: f32, history: &[f32]) {
        let filled = (score * METER_WIDTH as f32).round() as usize;
        let recent = history.iter().rev().take(20);
        let count = history.len().min(20);
        let average: f32 = recent.sum::<f32>() / count as f32;
        print!(
            "\r[{}{}] {:3.0}%  recent avg {:3.0}%",
            "#".repeat(filled),
            "-".repeat(METER_WIDTH - filled),
            score * 100.0,
            average * 100.0,
        );
        let _ = io::stdout().flush();
    }

    fn on_error(&mut self, error: &CaptureError) {
        eprintln!();
        eprintln!("audio capture failed: {error}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if args.list_chords {
        for name in chord::names() {
            println!("{name:4} {}", chord::chord_notes(name));
        }
        return Ok(());
    }

    let mut session = Session::new(SessionConfig::default());
    session.add_observer(Box::new(ConsoleMeter));
    session.start(&args.chord);
    info!(chord = %args.chord, "practice session started");

    println!(
        "Practicing {} ({}). Press Enter to stop.",
        args.chord,
        chord::chord_notes(&args.chord)
    );
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);

    session.stop();
    info!("practice session stopped");
    println!();

    if let Some(err) = session.take_error() {
        return Err(err.into());
    }
    Ok(())
}
