//! Trigram frequency tables
//!
//! A table maps a bigram key (two normalized tokens joined by a space) to
//! the tokens observed right after that bigram, with their counts. The same
//! windowing runs for every level of abstraction; only the normalization
//! applied to each token beforehand differs.

use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::corpus::Corpus;
use crate::pitch::{pitch_class_only, pitch_only, rhythm_only, strip_octave, to_relative, PitchClass};
use crate::token::{Sound, Token};

/// Separator between the two halves of a bigram key
pub const KEY_SEPARATOR: char = ' ';

/// Next-token counts for one bigram, in key order
pub type Distribution = BTreeMap<String, u32>;

/// Join two normalized tokens into a lookup key
pub fn bigram_key(first: &str, second: &str) -> String {
    format!("{}{}{}", first, KEY_SEPARATOR, second)
}

/// How much of a token survives into the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Abstraction {
    /// Pitch, octave and duration: `c4:4`
    Identity,
    /// Pitch and duration: `c:4`
    OctaveStripped,
    /// Pitch and octave: `c4`, `r`
    PitchOnly,
    /// Pitch alone: `c`, `r`
    PitchClassOnly,
    /// Duration alone: `4`, `8.5`
    DurationOnly,
    /// Semitones above the chord root plus duration: `4:4`, `r:8`
    ChordRelative,
}

impl Abstraction {
    /// Normalize one token. `root` is only read by [`Abstraction::ChordRelative`].
    pub fn normalize(self, token: &Token, root: PitchClass) -> String {
        match self {
            Abstraction::Identity => token.to_string(),
            Abstraction::OctaveStripped => strip_octave(token).to_string(),
            Abstraction::PitchOnly => pitch_only(token).to_string(),
            Abstraction::PitchClassOnly => pitch_class_only(token).to_string(),
            Abstraction::DurationOnly => rhythm_only(token).to_string(),
            Abstraction::ChordRelative => to_relative(token, root).to_string(),
        }
    }

    pub fn needs_root(self) -> bool {
        matches!(self, Abstraction::ChordRelative)
    }
}

/// Key half for the pitch-only tables, straight from a [`Sound`]
pub fn pitch_key(sound: &Sound, keep_octave: bool) -> String {
    match sound {
        Sound::Note(pitch) if !keep_octave => pitch.without_octave().to_string(),
        other => other.to_string(),
    }
}

/// Bigram -> next-token counts, built once and read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    entries: BTreeMap<String, Distribution>,
}

impl FrequencyTable {
    /// Slide a width-3 window over an already-normalized token stream.
    ///
    /// For each position `i` the pair `(i, i+1)` forms the key and `i+2` is
    /// counted as its follower.
    pub fn from_keys<I, S>(normalized: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stream: Vec<String> = normalized.into_iter().map(Into::into).collect();
        let mut table = FrequencyTable::default();
        for window in stream.windows(3) {
            table.record(&window[0], &window[1], &window[2]);
        }
        table
    }

    /// Build the table for one abstraction level over a corpus.
    ///
    /// Chord-relative tables only see lines carrying a chord annotation, each
    /// normalized against its own line's root, then windowed as one stream.
    /// Every other level windows over all valid tokens of the corpus.
    pub fn build(corpus: &Corpus, abstraction: Abstraction) -> Self {
        let table = if abstraction.needs_root() {
            Self::from_keys(
                corpus
                    .annotated()
                    .map(|a| abstraction.normalize(&a.token, a.root)),
            )
        } else {
            let unused_root = PitchClass::from_semitones(0);
            Self::from_keys(corpus.tokens().map(|t| abstraction.normalize(t, unused_root)))
        };
        tracing::debug!(
            "Built {:?} table: {} bigrams, {} observations",
            abstraction,
            table.len(),
            table.total_observations()
        );
        table
    }

    fn record(&mut self, first: &str, second: &str, next: &str) {
        *self
            .entries
            .entry(bigram_key(first, second))
            .or_default()
            .entry(next.to_string())
            .or_insert(0) += 1;
    }

    /// Followers of a bigram key, if it was ever seen
    pub fn followers(&self, key: &str) -> Option<&Distribution> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Distribution> {
        self.entries.iter()
    }

    /// Number of distinct bigram keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every count in the table (windows observed)
    pub fn total_observations(&self) -> u64 {
        self.entries
            .values()
            .flat_map(|d| d.values())
            .map(|&c| c as u64)
            .sum()
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = (&'a String, &'a Distribution);
    type IntoIter = btree_map::Iter<'a, String, Distribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
