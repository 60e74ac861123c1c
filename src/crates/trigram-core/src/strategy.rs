//! The five ways of proposing the next token
//!
//! Each strategy owns the tables it was trained on and turns the current
//! two-token context into a lookup key for them. They differ only in how
//! much of a token the key keeps and how a hit is turned back into an
//! absolute token.

use rand::Rng;

use crate::chord::ChordSymbol;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::frequency::{bigram_key, pitch_key, Abstraction, FrequencyTable};
use crate::generator::{Context, ProposeNext};
use crate::pitch::{assign_best_octave, from_relative, PitchClass, RelativeToken};
use crate::selector::select;
use crate::token::Token;

fn context_key(context: &Context, abstraction: Abstraction, root: PitchClass) -> String {
    bigram_key(
        &abstraction.normalize(&context.previous, root),
        &abstraction.normalize(&context.current, root),
    )
}

/// Full tokens in, full tokens out
#[derive(Debug, Clone, Default)]
pub struct Standard {
    pub table: FrequencyTable,
}

impl Standard {
    pub fn train(corpus: &Corpus) -> Self {
        Self {
            table: FrequencyTable::build(corpus, Abstraction::Identity),
        }
    }
}

impl ProposeNext for Standard {
    fn propose<R: Rng + ?Sized>(&self, context: &Context, _chord: &ChordSymbol, rng: &mut R) -> Result<Option<Token>> {
        let key = context_key(context, Abstraction::Identity, PitchClass::from_semitones(0));
        select(&self.table, &key, rng).map(str::parse::<Token>).transpose()
    }
}

/// Looks up without octaves, then places the pitch next to the last note
#[derive(Debug, Clone, Default)]
pub struct OctaveIgnorant {
    pub table: FrequencyTable,
}

impl OctaveIgnorant {
    pub fn train(corpus: &Corpus) -> Self {
        Self {
            table: FrequencyTable::build(corpus, Abstraction::OctaveStripped),
        }
    }
}

impl ProposeNext for OctaveIgnorant {
    fn propose<R: Rng + ?Sized>(&self, context: &Context, _chord: &ChordSymbol, rng: &mut R) -> Result<Option<Token>> {
        let key = context_key(context, Abstraction::OctaveStripped, PitchClass::from_semitones(0));
        let Some(next) = select(&self.table, &key, rng) else {
            return Ok(None);
        };
        let candidate: Token = next.parse()?;
        Ok(Some(assign_best_octave(&context.current, &candidate)))
    }
}

/// Reads the context as intervals above the current chord's root
#[derive(Debug, Clone, Default)]
pub struct RelativeScaleDegree {
    pub table: FrequencyTable,
}

impl RelativeScaleDegree {
    pub fn train(corpus: &Corpus) -> Self {
        Self {
            table: FrequencyTable::build(corpus, Abstraction::ChordRelative),
        }
    }
}

impl ProposeNext for RelativeScaleDegree {
    fn propose<R: Rng + ?Sized>(&self, context: &Context, chord: &ChordSymbol, rng: &mut R) -> Result<Option<Token>> {
        let root = chord.root();
        let key = context_key(context, Abstraction::ChordRelative, root);
        let Some(next) = select(&self.table, &key, rng) else {
            return Ok(None);
        };
        let relative: RelativeToken = next.parse()?;
        Ok(Some(from_relative(&relative, root, &context.current)))
    }
}

/// Rhythm and pitch chosen independently, then recombined
#[derive(Debug, Clone, Default)]
pub struct Separated {
    pub rhythm: FrequencyTable,
    pub pitch: FrequencyTable,
}

impl Separated {
    pub fn train(corpus: &Corpus) -> Self {
        Self {
            rhythm: FrequencyTable::build(corpus, Abstraction::DurationOnly),
            pitch: FrequencyTable::build(corpus, Abstraction::PitchOnly),
        }
    }
}

impl ProposeNext for Separated {
    fn propose<R: Rng + ?Sized>(&self, context: &Context, _chord: &ChordSymbol, rng: &mut R) -> Result<Option<Token>> {
        propose_separated(&self.rhythm, &self.pitch, true, context, rng)
    }
}

/// As [`Separated`], with the pitch half learned without octaves
#[derive(Debug, Clone, Default)]
pub struct SeparatedOctaveIgnorant {
    pub rhythm: FrequencyTable,
    pub pitch: FrequencyTable,
}

impl SeparatedOctaveIgnorant {
    pub fn train(corpus: &Corpus) -> Self {
        Self {
            rhythm: FrequencyTable::build(corpus, Abstraction::DurationOnly),
            pitch: FrequencyTable::build(corpus, Abstraction::PitchClassOnly),
        }
    }
}

impl ProposeNext for SeparatedOctaveIgnorant {
    fn propose<R: Rng + ?Sized>(&self, context: &Context, _chord: &ChordSymbol, rng: &mut R) -> Result<Option<Token>> {
        let Some(candidate) = propose_separated(&self.rhythm, &self.pitch, false, context, rng)? else {
            return Ok(None);
        };
        Ok(Some(assign_best_octave(&context.current, &candidate)))
    }
}

// Both halves are drawn before either result is checked, so a miss in one
// half still consumes the other half's draw.
fn propose_separated<R: Rng + ?Sized>(
    rhythm: &FrequencyTable,
    pitch: &FrequencyTable,
    keep_octave: bool,
    context: &Context,
    rng: &mut R,
) -> Result<Option<Token>> {
    let rhythm_key = bigram_key(
        &context.previous.duration.to_string(),
        &context.current.duration.to_string(),
    );
    let pitch_lookup = bigram_key(
        &pitch_key(&context.previous.sound, keep_octave),
        &pitch_key(&context.current.sound, keep_octave),
    );

    let duration = select(rhythm, &rhythm_key, rng);
    let sound = select(pitch, &pitch_lookup, rng);
    match (sound, duration) {
        (Some(sound), Some(duration)) => Ok(Some(format!("{}:{}", sound, duration).parse()?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beats::Beats;
    use crate::generator::MelodyGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use proptest::prelude::*;

    fn tok(s: &str) -> Token {
        s.parse().unwrap()
    }

    fn chord(s: &str) -> ChordSymbol {
        s.parse().unwrap()
    }

    fn corpus(text: &str) -> Corpus {
        Corpus::parse(text).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn test_standard_follows_identity_table() {
        let strategy = Standard::train(&corpus("r:8 r:8 c4:4 e4:4 g4:2"));
        let context = Context::silence();
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("c4:4")));

        let context = Context::new(tok("c4:4"), tok("e4:4"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("g4:2")));

        let context = Context::new(tok("g4:2"), tok("a4:4"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_octave_ignorant_reattaches_octave() {
        // learned in octave 5, proposed after a context in octave 3
        let strategy = OctaveIgnorant::train(&corpus("c5:4 e5:4 g5:4"));
        let context = Context::new(tok("c3:4"), tok("e3:4"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("g3:4")));
    }

    #[test]
    fn test_octave_ignorant_after_rest_uses_octave_four() {
        let strategy = OctaveIgnorant::train(&corpus("c5:4 r:4 e2:4"));
        let context = Context::new(tok("c6:4"), tok("r:4"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("e4:4")));
    }

    #[test]
    fn test_relative_transposes_to_current_chord() {
        // root, third, fifth over C
        let strategy = RelativeScaleDegree::train(&corpus("c4:4 e4:4 g4:4 | C"));
        let context = Context::new(tok("g4:4"), tok("b4:4"));
        assert_eq!(strategy.propose(&context, &chord("G"), &mut rng()).unwrap(), Some(tok("d5:4")));
    }

    #[test]
    fn test_relative_ignores_unannotated_lines() {
        let strategy = RelativeScaleDegree::train(&corpus("c4:4 e4:4 g4:4"));
        assert!(strategy.table.is_empty());
        let context = Context::new(tok("c4:4"), tok("e4:4"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_separated_recombines_halves() {
        let strategy = Separated::train(&corpus("c4:8 d4:8 e4:2"));
        let context = Context::new(tok("c4:8"), tok("d4:8"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("e4:2")));

        // same rhythm, pitches never heard together
        let context = Context::new(tok("a4:8"), tok("b4:8"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_separated_miss_in_rhythm_aborts() {
        let strategy = Separated::train(&corpus("c4:8 d4:8 e4:2"));
        let context = Context::new(tok("c4:4"), tok("d4:4"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), None);
    }

    #[test]
    fn test_separated_octave_ignorant_places_pitch() {
        let strategy = SeparatedOctaveIgnorant::train(&corpus("c4:8 d4:8 b3:2"));
        let context = Context::new(tok("c6:8"), tok("d6:8"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("b5:2")));
    }

    #[test]
    fn test_separated_rests_keep_their_duration() {
        let strategy = SeparatedOctaveIgnorant::train(&corpus("c4:8 d4:8 r:4"));
        let context = Context::new(tok("c4:8"), tok("d4:8"));
        assert_eq!(strategy.propose(&context, &chord("C"), &mut rng()).unwrap(), Some(tok("r:4")));
    }

    #[test]
    fn test_empty_tables_give_empty_measures() {
        let chords = vec![chord("C"), chord("G")];
        let mut generator = MelodyGenerator::seeded(1);
        let melody = generator.generate(&chords, &Standard::default()).unwrap();
        assert_eq!(melody.to_string(), " | C\n | G\n");
        let melody = generator.generate(&chords, &Separated::default()).unwrap();
        assert_eq!(melody.tokens().count(), 0);
    }

    #[test]
    fn test_cycle_fills_every_measure() {
        let text = "r:8 r:8 c4:4 d4:4 e4:4 f4:4 c4:4 d4:4 e4:4 f4:4 | C";
        let strategy = Standard::train(&corpus(text));
        let chords = vec![chord("C"), chord("F"), chord("G")];
        let melody = MelodyGenerator::seeded(9).generate(&chords, &strategy).unwrap();
        assert_eq!(melody.measures.len(), 3);
        for measure in &melody.measures {
            assert_eq!(measure.tokens.len(), 4);
            assert!(measure.is_full());
        }
    }

    #[test]
    fn test_coprime_denominators_stay_within_the_measure() {
        // oversize denominators are dropped at parse time
        let skipped = corpus("r:8 r:8 c4:4294967291 d4:4294967279 e4:4 | C");
        assert_eq!(skipped.skipped(), 2);
        assert_eq!(skipped.token_count(), 3);

        let corpus = corpus("r:8 r:8 c4:61 d4:59 e4:53 f4:47 g4:43 a4:41 b4:37 c5:31 d5:64 e5:63 | C\nc4:29 d4:23 e4:4 | G");
        let chords = vec![chord("C"), chord("G"), chord("F"), chord("C")];
        for algorithm in crate::algorithm::Algorithm::ALL {
            let melody = algorithm.train(&corpus).generate(&mut MelodyGenerator::seeded(1), &chords).unwrap();
            assert_eq!(melody.measures.len(), 4);
            for measure in &melody.measures {
                assert!(measure.beats() <= Beats::MEASURE, "{}: {}", algorithm, measure);
            }
        }
    }

    const TRAINING: &str = "\
r:8 r:8 c4:4 e4:8 g4:8 a4:4 c5:2 | C
r:8 b4:8 a4:8.5 g4:16 e4:4 d4:2 | G7
r:8 r:8 e4:2.5 f4:8 e4:8 c4:1 | Am
c4:4 d4:4 e4:4 f4:4 g4:2 r:2 | F
";

    proptest! {
        #[test]
        fn prop_measures_never_exceed_four_beats(seed in any::<u64>()) {
            let corpus = corpus(TRAINING);
            let chords = corpus.chords();
            let mut generator = MelodyGenerator::seeded(seed);
            let melodies = [
                generator.generate(&chords, &Standard::train(&corpus)).unwrap(),
                generator.generate(&chords, &OctaveIgnorant::train(&corpus)).unwrap(),
                generator.generate(&chords, &RelativeScaleDegree::train(&corpus)).unwrap(),
                generator.generate(&chords, &Separated::train(&corpus)).unwrap(),
                generator.generate(&chords, &SeparatedOctaveIgnorant::train(&corpus)).unwrap(),
            ];
            for melody in &melodies {
                prop_assert_eq!(melody.measures.len(), chords.len());
                for measure in &melody.measures {
                    prop_assert!(measure.beats() <= Beats::MEASURE);
                }
            }
        }

        #[test]
        fn prop_same_seed_same_melody(seed in any::<u64>()) {
            let corpus = corpus(TRAINING);
            let strategy = Separated::train(&corpus);
            let chords = corpus.chords();
            let first = MelodyGenerator::seeded(seed).generate(&chords, &strategy).unwrap();
            let second = MelodyGenerator::seeded(seed).generate(&chords, &strategy).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
