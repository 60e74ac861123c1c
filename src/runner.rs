//! One full generation run: corpus in, melodies, MIDI files and table
//! statistics out.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use trigram_core::{Algorithm, ChordSymbol, Corpus, MelodyGenerator, TableStats, TrainedModel};
use trigram_midi::{events_from_tokens, MidiWriter};

use crate::config::RunConfig;
use crate::report::format_stats;

pub const STATS_FILE: &str = "trigrams.txt";
pub const CORPUS_MIDI_FILE: &str = "melody.mid";

/// What one algorithm produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmOutcome {
    pub algorithm: Algorithm,
    pub measures: usize,
    pub tokens: usize,
    pub short_measures: usize,
    pub melody_file: PathBuf,
    pub midi_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub measures: usize,
    pub skipped_tokens: usize,
    pub outcomes: Vec<AlgorithmOutcome>,
}

#[derive(Serialize)]
struct LabelledStats<'a> {
    table: &'a str,
    stats: TableStats,
}

#[derive(Serialize)]
struct StatsFile<'a> {
    algorithm: &'a str,
    tables: Vec<LabelledStats<'a>>,
}

pub fn melody_path(output_dir: &Path, algorithm: Algorithm, extension: &str) -> PathBuf {
    output_dir.join(format!("generated_melody_{}.{}", algorithm.slug(), extension))
}

pub fn run(config: &RunConfig) -> Result<RunSummary> {
    config.validate()?;
    let output_dir = &config.output_dir;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let stats_path = output_dir.join(STATS_FILE);
    fs::write(&stats_path, "").with_context(|| format!("Failed to truncate {}", stats_path.display()))?;

    let text = fs::read_to_string(&config.corpus)
        .with_context(|| format!("Failed to read corpus {}", config.corpus.display()))?;
    let corpus = Corpus::parse(&text).with_context(|| format!("Failed to parse corpus {}", config.corpus.display()))?;
    if corpus.skipped() > 0 {
        tracing::warn!("Skipped {} malformed tokens in {}", corpus.skipped(), config.corpus.display());
    }

    let writer = MidiWriter::new(config.tempo_bpm, config.swing);
    let corpus_midi = output_dir.join(CORPUS_MIDI_FILE);
    writer.write(&events_from_tokens(corpus.tokens()), &corpus_midi)?;
    tracing::info!("Wrote corpus MIDI to {}", corpus_midi.display());

    let chords = corpus.chords();
    tracing::info!("Detected {} measures", chords.len());

    let mut outcomes = Vec::new();
    for &algorithm in &config.algorithms {
        let outcome = run_algorithm(config, algorithm, &corpus, &chords, &writer, &stats_path)?;
        outcomes.push(outcome);
    }

    Ok(RunSummary {
        measures: chords.len(),
        skipped_tokens: corpus.skipped(),
        outcomes,
    })
}

fn run_algorithm(
    config: &RunConfig,
    algorithm: Algorithm,
    corpus: &Corpus,
    chords: &[ChordSymbol],
    writer: &MidiWriter,
    stats_path: &Path,
) -> Result<AlgorithmOutcome> {
    tracing::info!("Running {} generation", algorithm.name());
    let model = algorithm.train(corpus);

    let mut generator = match config.seed {
        Some(seed) => MelodyGenerator::seeded(seed.wrapping_add(algorithm.index() as u64)),
        None => MelodyGenerator::from_entropy(),
    };
    let melody = model
        .generate(&mut generator, chords)
        .with_context(|| format!("{} generation failed", algorithm.name()))?;

    let melody_file = melody_path(&config.output_dir, algorithm, "txt");
    fs::write(&melody_file, melody.to_string())
        .with_context(|| format!("Failed to write {}", melody_file.display()))?;

    let midi_file = melody_path(&config.output_dir, algorithm, "mid");
    writer.write(&events_from_tokens(melody.tokens()), &midi_file)?;

    append_stats(stats_path, algorithm, &model)?;
    if config.stats_json {
        write_stats_json(&config.output_dir, algorithm, &model)?;
    }

    let outcome = AlgorithmOutcome {
        algorithm,
        measures: melody.measures.len(),
        tokens: melody.tokens().count(),
        short_measures: melody.short_measures(),
        melody_file,
        midi_file,
    };
    tracing::info!(
        "{}: {} tokens over {} measures ({} short), saved to {}",
        algorithm.name(),
        outcome.tokens,
        outcome.measures,
        outcome.short_measures,
        outcome.melody_file.display()
    );
    Ok(outcome)
}

fn append_stats(path: &Path, algorithm: Algorithm, model: &TrainedModel) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for (label, table) in model.tables() {
        let title = format!("{} - {} Stats", algorithm.name(), label);
        file.write_all(format_stats(&title, &TableStats::of(table)).as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn write_stats_json(output_dir: &Path, algorithm: Algorithm, model: &TrainedModel) -> Result<()> {
    let file = StatsFile {
        algorithm: algorithm.name(),
        tables: model
            .tables()
            .into_iter()
            .map(|(table, t)| LabelledStats {
                table,
                stats: TableStats::of(t),
            })
            .collect(),
    };
    let path = output_dir.join(format!("stats_{}.json", algorithm.slug()));
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
