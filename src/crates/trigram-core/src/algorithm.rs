use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chord::ChordSymbol;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::generator::{Melody, MelodyGenerator};
use crate::strategy::{OctaveIgnorant, RelativeScaleDegree, Separated, SeparatedOctaveIgnorant, Standard};

/// The generation pipelines, in the order a full run executes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Standard,
    OctaveIgnorant,
    RelativeScaleDegree,
    Separated,
    SeparatedOctaveIgnorant,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Standard,
        Algorithm::OctaveIgnorant,
        Algorithm::RelativeScaleDegree,
        Algorithm::Separated,
        Algorithm::SeparatedOctaveIgnorant,
    ];

    /// Human-readable name used in report titles
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Standard => "Standard",
            Algorithm::OctaveIgnorant => "Octave-Ignorant",
            Algorithm::RelativeScaleDegree => "Relative Scale Degree",
            Algorithm::Separated => "Separated",
            Algorithm::SeparatedOctaveIgnorant => "Separated Octave-Ignorant",
        }
    }

    /// File-name fragment: `generated_melody_<slug>.txt`
    pub fn slug(self) -> &'static str {
        match self {
            Algorithm::Standard => "standard",
            Algorithm::OctaveIgnorant => "octave_ignorant",
            Algorithm::RelativeScaleDegree => "relative_scale_degree",
            Algorithm::Separated => "separated",
            Algorithm::SeparatedOctaveIgnorant => "separated_octave_ignorant",
        }
    }

    /// Value accepted on the command line and in config files
    pub fn cli_value(self) -> &'static str {
        match self {
            Algorithm::Standard => "standard",
            Algorithm::OctaveIgnorant => "octave-ignorant",
            Algorithm::RelativeScaleDegree => "relative-scale-degree",
            Algorithm::Separated => "separated",
            Algorithm::SeparatedOctaveIgnorant => "separated-octave-ignorant",
        }
    }

    /// Position in [`Algorithm::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn train(self, corpus: &Corpus) -> TrainedModel {
        tracing::debug!("Training {} model", self.name());
        match self {
            Algorithm::Standard => TrainedModel::Standard(Standard::train(corpus)),
            Algorithm::OctaveIgnorant => TrainedModel::OctaveIgnorant(OctaveIgnorant::train(corpus)),
            Algorithm::RelativeScaleDegree => TrainedModel::RelativeScaleDegree(RelativeScaleDegree::train(corpus)),
            Algorithm::Separated => TrainedModel::Separated(Separated::train(corpus)),
            Algorithm::SeparatedOctaveIgnorant => {
                TrainedModel::SeparatedOctaveIgnorant(SeparatedOctaveIgnorant::train(corpus))
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.cli_value() == s || a.slug() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Algorithm::ALL.iter().map(|a| a.cli_value()).collect();
                format!("unknown algorithm '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// A strategy together with the tables it learned
#[derive(Debug, Clone)]
pub enum TrainedModel {
    Standard(Standard),
    OctaveIgnorant(OctaveIgnorant),
    RelativeScaleDegree(RelativeScaleDegree),
    Separated(Separated),
    SeparatedOctaveIgnorant(SeparatedOctaveIgnorant),
}

impl TrainedModel {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TrainedModel::Standard(_) => Algorithm::Standard,
            TrainedModel::OctaveIgnorant(_) => Algorithm::OctaveIgnorant,
            TrainedModel::RelativeScaleDegree(_) => Algorithm::RelativeScaleDegree,
            TrainedModel::Separated(_) => Algorithm::Separated,
            TrainedModel::SeparatedOctaveIgnorant(_) => Algorithm::SeparatedOctaveIgnorant,
        }
    }

    pub fn generate<R: Rng>(&self, generator: &mut MelodyGenerator<R>, chords: &[ChordSymbol]) -> Result<Melody> {
        match self {
            TrainedModel::Standard(s) => generator.generate(chords, s),
            TrainedModel::OctaveIgnorant(s) => generator.generate(chords, s),
            TrainedModel::RelativeScaleDegree(s) => generator.generate(chords, s),
            TrainedModel::Separated(s) => generator.generate(chords, s),
            TrainedModel::SeparatedOctaveIgnorant(s) => generator.generate(chords, s),
        }
    }

    /// Every table the model consults, labelled for reporting
    pub fn tables(&self) -> Vec<(&'static str, &FrequencyTable)> {
        match self {
            TrainedModel::Standard(s) => vec![("Standard", &s.table)],
            TrainedModel::OctaveIgnorant(s) => vec![("Octave-Ignorant", &s.table)],
            TrainedModel::RelativeScaleDegree(s) => vec![("Relative Scale Degree", &s.table)],
            TrainedModel::Separated(s) => vec![("Rhythm", &s.rhythm), ("Pitch", &s.pitch)],
            TrainedModel::SeparatedOctaveIgnorant(s) => {
                vec![("Rhythm", &s.rhythm), ("Pitch (Octave-Ignorant)", &s.pitch)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_values_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.cli_value().parse::<Algorithm>().unwrap(), algorithm);
            assert_eq!(algorithm.slug().parse::<Algorithm>().unwrap(), algorithm);
            assert_eq!(Algorithm::ALL[algorithm.index()], algorithm);
        }
        assert!("markov".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_serde_uses_cli_values() {
        let json = serde_json::to_string(&Algorithm::SeparatedOctaveIgnorant).unwrap();
        assert_eq!(json, r#""separated-octave-ignorant""#);
        let back: Algorithm = serde_json::from_str(r#""relative-scale-degree""#).unwrap();
        assert_eq!(back, Algorithm::RelativeScaleDegree);
    }

    #[test]
    fn test_trained_tables_are_labelled() {
        let corpus = Corpus::parse("c4:4 e4:4 g4:4 c5:4 | C").unwrap();
        let labels: Vec<Vec<&str>> = Algorithm::ALL
            .into_iter()
            .map(|a| a.train(&corpus).tables().into_iter().map(|(label, _)| label).collect())
            .collect();
        assert_eq!(
            labels,
            vec![
                vec!["Standard"],
                vec!["Octave-Ignorant"],
                vec!["Relative Scale Degree"],
                vec!["Rhythm", "Pitch"],
                vec!["Rhythm", "Pitch (Octave-Ignorant)"],
            ]
        );
    }

    #[test]
    fn test_model_generates_one_measure_per_chord() {
        let corpus = Corpus::parse("r:8 r:8 c4:4 e4:4 g4:4 c5:4 | C\nr:8 r:8 g4:4 b4:4 d5:2 | G").unwrap();
        let chords = corpus.chords();
        for algorithm in Algorithm::ALL {
            let model = algorithm.train(&corpus);
            assert_eq!(model.algorithm(), algorithm);
            let melody = model.generate(&mut MelodyGenerator::seeded(5), &chords).unwrap();
            assert_eq!(melody.measures.len(), 2, "{}", algorithm);
        }
    }
}
