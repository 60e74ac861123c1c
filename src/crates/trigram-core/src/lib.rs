//! Trigram models of monophonic melody
//!
//! This crate learns second-order (trigram) statistics from a corpus of
//! textual note tokens and uses them to generate new melodies over a chord
//! progression, one four-beat measure per chord.
//!
//! # Examples
//!
//! ```
//! use trigram_core::{Algorithm, Corpus, MelodyGenerator};
//!
//! let corpus = Corpus::parse("r:8 r:8 c4:4 e4:4 g4:4 c5:4 | C").unwrap();
//! let model = Algorithm::Standard.train(&corpus);
//! let melody = model
//!     .generate(&mut MelodyGenerator::seeded(7), &corpus.chords())
//!     .unwrap();
//! assert_eq!(melody.to_string(), "c4:4 e4:4 g4:4 c5:4 | C\n");
//! ```
//!
//! # Main Components
//!
//! - **Token**: a pitch (or rest) with a duration, written `c#4:8`
//! - **FrequencyTable**: bigram -> next-token counts at one level of abstraction
//! - **MelodyGenerator**: the measure loop, driven by a `ProposeNext` strategy
//! - **Algorithm**: the five trained pipelines
//! - **TableStats**: summary numbers for a table

pub mod algorithm;
pub mod beats;
pub mod chord;
pub mod corpus;
pub mod error;
pub mod frequency;
pub mod generator;
pub mod pitch;
pub mod selector;
pub mod stats;
pub mod strategy;
pub mod token;

pub use algorithm::{Algorithm, TrainedModel};
pub use beats::Beats;
pub use chord::{parse_chords, ChordSymbol};
pub use corpus::{scan_tokens, Corpus, CorpusLine};
pub use error::{Error, Result};
pub use frequency::{Abstraction, Distribution, FrequencyTable};
pub use generator::{Context, Measure, Melody, MelodyGenerator, ProposeNext};
pub use pitch::{assign_best_octave, PitchClass, RelativeToken};
pub use selector::select;
pub use stats::TableStats;
pub use token::{Duration, Pitch, Sound, Token};
