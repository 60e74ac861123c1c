//! Measure-bounded melody generation
//!
//! One measure is produced per chord. Each step asks a [`ProposeNext`]
//! strategy for a token given the last two tokens; the measure ends when
//! the strategy has nothing to offer (a stall) or the proposal would push
//! the measure past four beats. The two-token context carries over from one
//! measure to the next.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;

use crate::beats::Beats;
use crate::chord::ChordSymbol;
use crate::error::Result;
use crate::token::{Duration, Token};

/// The two most recent tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub previous: Token,
    pub current: Token,
}

impl Context {
    pub fn new(previous: Token, current: Token) -> Self {
        Self { previous, current }
    }

    /// Two eighth-note rests, the lead-in every run starts from
    pub fn silence() -> Self {
        let rest = Token::rest(Duration::EIGHTH);
        Self::new(rest, rest)
    }

    /// Shift `next` in, dropping the older token
    pub fn advance(&mut self, next: Token) {
        self.previous = self.current;
        self.current = next;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::silence()
    }
}

/// Per-step proposal of the next token
pub trait ProposeNext {
    /// Propose the token following `context` under `chord`.
    ///
    /// `Ok(None)` means there is no learned continuation; the current measure
    /// ends there.
    fn propose<R: Rng + ?Sized>(&self, context: &Context, chord: &ChordSymbol, rng: &mut R) -> Result<Option<Token>>;
}

/// Tokens generated against one chord, at most four beats long
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub chord: ChordSymbol,
    pub tokens: Vec<Token>,
}

impl Measure {
    pub fn new(chord: ChordSymbol) -> Self {
        Self {
            chord,
            tokens: Vec::new(),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn beats(&self) -> Beats {
        self.tokens.iter().map(Token::beats).sum()
    }

    /// True when the measure reached exactly four beats
    pub fn is_full(&self) -> bool {
        self.beats() == Beats::MEASURE
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.tokens.iter().map(Token::to_string).collect();
        write!(f, "{} | {}", tokens.join(" "), self.chord)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Melody {
    pub measures: Vec<Measure>,
}

impl Melody {
    /// All tokens in order, measure boundaries dropped
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.measures.iter().flat_map(|m| m.tokens.iter())
    }

    pub fn beats(&self) -> Beats {
        self.measures.iter().map(Measure::beats).sum()
    }

    /// Measures that stalled before reaching four beats
    pub fn short_measures(&self) -> usize {
        self.measures.iter().filter(|m| !m.is_full()).count()
    }
}

/// One measure per line, `tokens | chord`, readable back as a corpus
impl fmt::Display for Melody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for measure in &self.measures {
            writeln!(f, "{}", measure)?;
        }
        Ok(())
    }
}

/// Runs the measure loop with a single random source for the whole run
pub struct MelodyGenerator<R: Rng> {
    rng: R,
}

impl MelodyGenerator<StdRng> {
    /// Reproducible generator: the same seed gives the same melody
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> MelodyGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate one measure per chord, starting from two eighth rests
    pub fn generate<S: ProposeNext>(&mut self, chords: &[ChordSymbol], strategy: &S) -> Result<Melody> {
        self.generate_from(chords, Context::silence(), strategy)
    }

    pub fn generate_from<S: ProposeNext>(
        &mut self,
        chords: &[ChordSymbol],
        mut context: Context,
        strategy: &S,
    ) -> Result<Melody> {
        let mut melody = Melody::default();
        for chord in chords {
            let measure = self.fill_measure(chord, &mut context, strategy)?;
            melody.measures.push(measure);
        }
        Ok(melody)
    }

    fn fill_measure<S: ProposeNext>(
        &mut self,
        chord: &ChordSymbol,
        context: &mut Context,
        strategy: &S,
    ) -> Result<Measure> {
        let mut measure = Measure::new(chord.clone());
        let mut filled = Beats::ZERO;

        while filled < Beats::MEASURE {
            let Some(next) = strategy.propose(context, chord, &mut self.rng)? else {
                tracing::debug!("Stalled over {} after {} beats", chord, filled);
                break;
            };
            let length = next.beats();
            if filled + length > Beats::MEASURE {
                tracing::debug!("{} does not fit over {} after {} beats", next, chord, filled);
                break;
            }
            measure.tokens.push(next);
            filled = filled + length;
            context.advance(next);
        }

        Ok(measure)
    }
}
