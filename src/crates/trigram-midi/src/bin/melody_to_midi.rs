use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trigram_midi::{events_from_text, MidiWriter};

#[derive(Parser, Debug)]
#[command(name = "melody-to-midi")]
#[command(about = "Convert a token melody text file to a MIDI file", long_about = None)]
struct Args {
    /// Melody or corpus text file
    #[arg(default_value = "data/melody.txt")]
    input: PathBuf,

    /// Output file path (default: `<input-name>.mid` next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(short, long, default_value = "120")]
    tempo: u32,

    /// Play eighth notes straight instead of swung
    #[arg(long)]
    no_swing: bool,

    /// Suppress informational messages (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet { "error" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if args.tempo == 0 {
        anyhow::bail!("Tempo must be at least 1 BPM");
    }
    if !args.input.exists() {
        anyhow::bail!("Melody file not found: {}", args.input.display());
    }

    let output = args.output.unwrap_or_else(|| args.input.with_extension("mid"));

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let events = events_from_text(&text).with_context(|| format!("Failed to parse {}", args.input.display()))?;

    MidiWriter::new(args.tempo, !args.no_swing).write(&events, &output)?;
    tracing::info!("Wrote {} events to {}", events.len(), output.display());

    Ok(())
}
