use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::pitch::PitchClass;
use crate::token::PitchName;

/// A chord annotation as written (`C`, `Am7`, `Bb`), reduced to its root
///
/// Only the leading letter and optional accidental are read; any quality
/// suffix is kept for display but carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChordSymbol {
    symbol: String,
    root: PitchClass,
}

impl ChordSymbol {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn root(&self) -> PitchClass {
        self.root
    }
}

impl FromStr for ChordSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let symbol = s.trim();
        let (name, _quality) =
            PitchName::split_prefix(symbol).ok_or_else(|| Error::UnresolvableChord(symbol.to_string()))?;
        Ok(ChordSymbol {
            symbol: symbol.to_string(),
            root: name.class(),
        })
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Serialize for ChordSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.symbol)
    }
}

/// Parse a whole chord sequence, failing on the first unresolvable symbol
pub fn parse_chords<I, S>(symbols: I) -> Result<Vec<ChordSymbol>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols.into_iter().map(|s| s.as_ref().parse()).collect()
}
