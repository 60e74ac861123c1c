//! Pitch/duration tokens and their text encoding
//!
//! A token is written `<pitch><octave?>:<duration>` (for example `c4:4`,
//! `f#:8`, `bb3:4.5`) or `r:<duration>` for a rest. The duration is a note
//! denominator (4 = quarter, 8 = eighth); a `.5` suffix marks it dotted.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::beats::Beats;
use crate::error::{Error, Result};

/// Octave used when a pitch has none (octave 4 holds middle C, pitch 60)
pub const DEFAULT_OCTAVE: u8 = 4;

/// Highest octave digit a token may carry
pub const MAX_OCTAVE: u8 = 9;

/// Shortest note value a token may carry (a 64th note)
pub const MAX_DENOMINATOR: u32 = 64;

const DOTTED_SUFFIX: &str = ".5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'c' => Some(Letter::C),
            'd' => Some(Letter::D),
            'e' => Some(Letter::E),
            'f' => Some(Letter::F),
            'g' => Some(Letter::G),
            'a' => Some(Letter::A),
            'b' => Some(Letter::B),
            _ => None,
        }
    }

    /// Semitones above C
    pub fn offset(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'c',
            Letter::D => 'd',
            Letter::E => 'e',
            Letter::F => 'f',
            Letter::G => 'g',
            Letter::A => 'a',
            Letter::B => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Accidental::Sharp),
            'b' | 'B' => Some(Accidental::Flat),
            _ => None,
        }
    }

    pub fn offset(self) -> i32 {
        match self {
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Accidental::Sharp => '#',
            Accidental::Flat => 'b',
        }
    }
}

/// A spelled pitch without octave: letter plus optional accidental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchName {
    pub letter: Letter,
    pub accidental: Option<Accidental>,
}

impl PitchName {
    pub fn new(letter: Letter, accidental: Option<Accidental>) -> Self {
        Self { letter, accidental }
    }

    /// Split a leading pitch name off `s`, returning the name and the rest.
    ///
    /// `b` after the letter is read as a flat, so `bb4` is b-flat 4 and `b4`
    /// is b 4.
    pub fn split_prefix(s: &str) -> Option<(PitchName, &str)> {
        let mut chars = s.char_indices();
        let (_, first) = chars.next()?;
        let letter = Letter::from_char(first)?;
        let after_letter = first.len_utf8();
        match chars.next() {
            Some((i, c)) => match Accidental::from_char(c) {
                Some(acc) => Some((PitchName::new(letter, Some(acc)), &s[i + c.len_utf8()..])),
                None => Some((PitchName::new(letter, None), &s[after_letter..])),
            },
            None => Some((PitchName::new(letter, None), "")),
        }
    }

    /// Semitones above C, before octave placement (`cb` is -1, `b#` is 12)
    pub fn offset(&self) -> i32 {
        self.letter.offset() + self.accidental.map_or(0, Accidental::offset)
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        if let Some(acc) = self.accidental {
            write!(f, "{}", acc.as_char())?;
        }
        Ok(())
    }
}

/// A pitch name with an optional octave digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub name: PitchName,
    pub octave: Option<u8>,
}

impl Pitch {
    pub fn new(name: PitchName, octave: Option<u8>) -> Self {
        Self { name, octave }
    }

    /// MIDI-style pitch number, `12 * (octave + 1) + offset`.
    ///
    /// A pitch without octave is placed in [`DEFAULT_OCTAVE`].
    pub fn number(&self) -> i32 {
        let octave = self.octave.unwrap_or(DEFAULT_OCTAVE) as i32;
        12 * (octave + 1) + self.name.offset()
    }

    pub fn with_octave(self, octave: u8) -> Self {
        Self {
            octave: Some(octave),
            ..self
        }
    }

    pub fn without_octave(self) -> Self {
        Self {
            octave: None,
            ..self
        }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(octave) = self.octave {
            write!(f, "{}", octave)?;
        }
        Ok(())
    }
}

impl FromStr for Pitch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, rest) = PitchName::split_prefix(s)
            .ok_or_else(|| Error::malformed(s, "pitch letter must be one of a-g"))?;
        let octave = match rest {
            "" => None,
            digit if digit.len() == 1 && digit.bytes().all(|b| b.is_ascii_digit()) => {
                Some(digit.as_bytes()[0] - b'0')
            }
            other => return Err(Error::malformed(s, format!("octave '{}' must be a single digit 0-9", other))),
        };
        Ok(Pitch { name, octave })
    }
}

/// The pitch half of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Rest,
    Note(Pitch),
}

impl Sound {
    pub fn is_rest(&self) -> bool {
        matches!(self, Sound::Rest)
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sound::Rest => write!(f, "r"),
            Sound::Note(pitch) => write!(f, "{}", pitch),
        }
    }
}

impl FromStr for Sound {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("r") {
            Ok(Sound::Rest)
        } else {
            s.parse().map(Sound::Note)
        }
    }
}

/// A note value written as its denominator, optionally dotted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    denominator: u32,
    dotted: bool,
}

impl Duration {
    pub const QUARTER: Duration = Duration {
        denominator: 4,
        dotted: false,
    };

    pub const EIGHTH: Duration = Duration {
        denominator: 8,
        dotted: false,
    };

    /// Denominators run from 1 (whole note) to [`MAX_DENOMINATOR`]
    pub fn new(denominator: u32, dotted: bool) -> Result<Self> {
        if !(1..=MAX_DENOMINATOR).contains(&denominator) {
            let text = format!("{}{}", denominator, if dotted { DOTTED_SUFFIX } else { "" });
            return Err(Error::malformed(
                text,
                format!("duration denominator must be between 1 and {}", MAX_DENOMINATOR),
            ));
        }
        Ok(Self {
            denominator,
            dotted,
        })
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    pub fn is_dotted(&self) -> bool {
        self.dotted
    }

    /// Length in quarter-note beats: `4 / denominator`, times 1.5 when dotted
    pub fn beats(&self) -> Beats {
        let numerator = if self.dotted { 6 } else { 4 };
        Beats::new(numerator, self.denominator as i128)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.denominator)?;
        if self.dotted {
            write!(f, "{}", DOTTED_SUFFIX)?;
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, dotted) = match s.strip_suffix(DOTTED_SUFFIX) {
            Some(base) => (base, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::malformed(s, format!("invalid duration '{}'", s)));
        }
        let denominator: u32 = digits
            .parse()
            .map_err(|_| Error::malformed(s, format!("invalid duration '{}'", s)))?;
        Duration::new(denominator, dotted)
    }
}

/// A pitch or rest paired with a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub sound: Sound,
    pub duration: Duration,
}

impl Token {
    pub fn rest(duration: Duration) -> Self {
        Self {
            sound: Sound::Rest,
            duration,
        }
    }

    pub fn note(pitch: Pitch, duration: Duration) -> Self {
        Self {
            sound: Sound::Note(pitch),
            duration,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.sound.is_rest()
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        match &self.sound {
            Sound::Note(pitch) => Some(pitch),
            Sound::Rest => None,
        }
    }

    pub fn beats(&self) -> Beats {
        self.duration.beats()
    }

    /// True when the word carries the pitch/duration separator.
    ///
    /// Words without it (comments, chord labels) are not tokens at all.
    pub fn looks_like_token(word: &str) -> bool {
        word.contains(':')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sound, self.duration)
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (sound, duration) = s
            .split_once(':')
            .ok_or_else(|| Error::malformed(s, "missing ':' between pitch and duration"))?;
        if duration.contains(':') {
            return Err(Error::malformed(s, "more than one ':' separator"));
        }
        let sound = sound.parse().map_err(|e| rewrap(e, s))?;
        let duration = duration.parse().map_err(|e| rewrap(e, s))?;
        Ok(Token { sound, duration })
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// Report the whole token text rather than the half that failed.
fn rewrap(err: Error, token: &str) -> Error {
    match err {
        Error::MalformedToken { reason, .. } => Error::malformed(token, reason),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(s: &str) -> Token {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_note() {
        let t = tok("c4:4");
        let pitch = t.pitch().unwrap();
        assert_eq!(pitch.name, PitchName::new(Letter::C, None));
        assert_eq!(pitch.octave, Some(4));
        assert_eq!(t.duration, Duration::QUARTER);
        assert_eq!(pitch.number(), 60);
    }

    #[test]
    fn test_parse_accidentals() {
        assert_eq!(tok("f#3:8").pitch().unwrap().number(), 54);
        assert_eq!(tok("bb3:8").pitch().unwrap().number(), 58);
        assert_eq!(tok("b3:8").pitch().unwrap().number(), 59);
        assert_eq!(tok("eb:8").pitch().unwrap().octave, None);
        assert_eq!(tok("Bb4:4").to_string(), "bb4:4");
    }

    #[test]
    fn test_parse_rest_and_dotted() {
        let t = tok("r:4.5");
        assert!(t.is_rest());
        assert!(t.duration.is_dotted());
        assert_eq!(t.beats(), Beats::new(3, 2));
        assert_eq!(tok("R:8").to_string(), "r:8");
    }

    #[test]
    fn test_durations() {
        assert_eq!(tok("c4:1").beats(), Beats::whole(4));
        assert_eq!(tok("c4:2.5").beats(), Beats::whole(3));
        assert_eq!(tok("c4:16").beats(), Beats::new(1, 4));
        assert_eq!(tok("c4:8.5").beats(), Beats::new(3, 4));
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["c4:4", "r:8", "f#:16", "ab2:4.5", "b9:1"] {
            assert_eq!(tok(s).to_string(), s);
        }
    }

    #[test]
    fn test_malformed_tokens() {
        for s in [
            "c4", "h4:4", "c10:4", "c4:0", "c4:x", "c4:4:4", "cx:4", ":4", "c4:", "c+4:4", "c04:4", "c4:+8", "c4:-8",
            "c4: 8", "c4:128", "c4:4294967291",
        ] {
            assert!(
                matches!(s.parse::<Token>(), Err(Error::MalformedToken { .. })),
                "expected '{}' to be rejected",
                s
            );
        }
    }

    #[test]
    fn test_denominator_limit() {
        assert_eq!(tok("c4:64").beats(), Beats::new(1, 16));
        assert_eq!(tok("r:64.5").beats(), Beats::new(3, 32));
        assert!(Duration::new(65, false).is_err());
        assert!(Duration::new(0, true).is_err());
    }

    #[test]
    fn test_malformed_error_names_whole_token() {
        let err = "c4:zz".parse::<Token>().unwrap_err();
        assert!(err.to_string().contains("'c4:zz'"));
    }

    #[test]
    fn test_looks_like_token() {
        assert!(Token::looks_like_token("c4:4"));
        assert!(!Token::looks_like_token("Am7"));
        assert!(!Token::looks_like_token("|"));
    }

    #[test]
    fn test_serializes_as_text() {
        let json = serde_json::to_string(&tok("g5:8.5")).unwrap();
        assert_eq!(json, "\"g5:8.5\"");
    }
}
