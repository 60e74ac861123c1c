//! Command-line driver for the trigram melody generator
//!
//! Ties the corpus reader, the five generation pipelines and the MIDI
//! writer together into a single run that fills an output directory.

pub mod config;
pub mod logging;
pub mod report;
pub mod runner;

pub use config::{Overrides, RunConfig};
pub use runner::{run, AlgorithmOutcome, RunSummary};
