use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use trigram_core::Algorithm;
use trigram_melody_app::logging::{self, Verbosity};
use trigram_melody_app::{run, Overrides, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "trigram-melody")]
#[command(about = "Learn trigram statistics from a melody corpus and generate new melodies over its chords", long_about = None)]
struct Args {
    /// Corpus text file (default: data/melody.txt)
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Directory for generated melodies, MIDI files and statistics (default: output)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seed for reproducible output; each algorithm adds its index
    #[arg(short, long)]
    seed: Option<u64>,

    /// Tempo of the written MIDI files in BPM (default: 120)
    #[arg(short, long)]
    tempo: Option<u32>,

    /// Run only these algorithms (repeatable). Defaults to all five.
    #[arg(short, long = "algorithm")]
    algorithms: Vec<Algorithm>,

    /// Play eighth notes straight instead of swung
    #[arg(long)]
    no_swing: bool,

    /// Also write per-algorithm table statistics as JSON
    #[arg(long)]
    stats_json: bool,

    /// JSON config file; flags given on the command line override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print per-measure generation details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(Verbosity::from_flags(args.quiet, args.verbose));

    let base = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let config = base.apply(Overrides {
        corpus: args.corpus,
        output_dir: args.output_dir,
        tempo_bpm: args.tempo,
        seed: args.seed,
        no_swing: args.no_swing,
        algorithms: args.algorithms,
        stats_json: args.stats_json,
    });

    let summary = run(&config)?;
    tracing::info!(
        "Generated {} melodies over {} measures in {}",
        summary.outcomes.len(),
        summary.measures,
        config.output_dir.display()
    );
    Ok(())
}
