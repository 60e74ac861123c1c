use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use trigram_core::Algorithm;

/// Settings for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub corpus: PathBuf,
    pub output_dir: PathBuf,
    pub tempo_bpm: u32,
    /// Base seed; each algorithm adds its index. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub swing: bool,
    pub algorithms: Vec<Algorithm>,
    pub stats_json: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from("data/melody.txt"),
            output_dir: PathBuf::from("output"),
            tempo_bpm: 120,
            seed: None,
            swing: true,
            algorithms: Algorithm::ALL.to_vec(),
            stats_json: false,
        }
    }
}

/// Values given on the command line; `None` keeps the file or default value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub corpus: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub tempo_bpm: Option<u32>,
    pub seed: Option<u64>,
    pub no_swing: bool,
    pub algorithms: Vec<Algorithm>,
    pub stats_json: bool,
}

impl RunConfig {
    /// Read a JSON config; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(corpus) = overrides.corpus {
            self.corpus = corpus;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(tempo) = overrides.tempo_bpm {
            self.tempo_bpm = tempo;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
        if overrides.no_swing {
            self.swing = false;
        }
        if !overrides.algorithms.is_empty() {
            self.algorithms = overrides.algorithms;
        }
        if overrides.stats_json {
            self.stats_json = true;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tempo_bpm == 0 {
            anyhow::bail!("Tempo must be at least 1 BPM");
        }
        if self.algorithms.is_empty() {
            anyhow::bail!("No algorithms selected");
        }
        Ok(())
    }
}
