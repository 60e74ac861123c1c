//! Pitch abstraction transforms
//!
//! Converts between absolute tokens, octave-less tokens and tokens relative
//! to a chord root, and re-attaches an octave to an octave-less candidate
//! with the continuity heuristic ([`assign_best_octave`]).

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::token::{Accidental, Duration, Letter, Pitch, PitchName, Sound, Token, DEFAULT_OCTAVE, MAX_OCTAVE};

/// Semitones in an octave
pub const OCTAVE: i32 = 12;

/// Highest valid MIDI pitch number
pub const MAX_PITCH_NUMBER: i32 = 127;

/// Canonical spelling per pitch class, flats for the black keys except F#/C#
const SPELLINGS: [(Letter, Option<Accidental>); 12] = [
    (Letter::C, None),
    (Letter::C, Some(Accidental::Sharp)),
    (Letter::D, None),
    (Letter::E, Some(Accidental::Flat)),
    (Letter::E, None),
    (Letter::F, None),
    (Letter::F, Some(Accidental::Sharp)),
    (Letter::G, None),
    (Letter::A, Some(Accidental::Flat)),
    (Letter::A, None),
    (Letter::B, Some(Accidental::Flat)),
    (Letter::B, None),
];

/// A pitch reduced modulo the octave, in semitones above C (0-11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Reduce any semitone count into 0-11
    pub fn from_semitones(semitones: i32) -> Self {
        PitchClass(semitones.rem_euclid(OCTAVE) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Semitones from `root` up to `self`
    pub fn interval_above(self, root: PitchClass) -> u8 {
        (self.0 as i32 - root.0 as i32).rem_euclid(OCTAVE) as u8
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::from_semitones(self.0 as i32 + semitones)
    }

    /// The canonical spelling (`c c# d eb e f f# g ab a bb b`)
    pub fn spelling(self) -> PitchName {
        let (letter, accidental) = SPELLINGS[self.0 as usize];
        PitchName::new(letter, accidental)
    }
}

impl PitchName {
    pub fn class(&self) -> PitchClass {
        PitchClass::from_semitones(self.offset())
    }

    /// Canonical spelling of a pitch class
    pub fn from_class(class: PitchClass) -> Self {
        class.spelling()
    }
}

impl Pitch {
    pub fn class(&self) -> PitchClass {
        self.name.class()
    }
}

/// Pitch number back to an absolute pitch with canonical spelling
pub fn pitch_from_number(number: i32) -> Option<Pitch> {
    if !(0..=MAX_PITCH_NUMBER).contains(&number) {
        return None;
    }
    let octave = number.div_euclid(OCTAVE) - 1;
    let name = PitchClass::from_semitones(number).spelling();
    u8::try_from(octave).ok().map(|octave| Pitch::new(name, Some(octave)))
}

/// Remove the octave digit from a note token (`c5:8` -> `c:8`); rests pass through
pub fn strip_octave(token: &Token) -> Token {
    match token.sound {
        Sound::Note(pitch) => Token::note(pitch.without_octave(), token.duration),
        Sound::Rest => *token,
    }
}

/// Give an octave-less note the default octave 4 (`c:8` -> `c4:8`)
pub fn add_default_octave(token: &Token) -> Token {
    match token.sound {
        Sound::Note(pitch) if pitch.octave.is_none() => {
            Token::note(pitch.with_octave(DEFAULT_OCTAVE), token.duration)
        }
        _ => *token,
    }
}

/// Pitch and octave only (`c5:8` -> `c5`, `r:8` -> `r`)
pub fn pitch_only(token: &Token) -> Sound {
    token.sound
}

/// Pitch without octave (`c5:8` -> `c`)
pub fn pitch_class_only(token: &Token) -> Sound {
    strip_octave(token).sound
}

/// Duration only (`c5:8.5` -> `8.5`)
pub fn rhythm_only(token: &Token) -> Duration {
    token.duration
}

/// Octave of the pitch as derived from its pitch number.
///
/// This differs from the written octave for `cb` and `b#`, which cross the
/// octave boundary.
fn sounding_octave(pitch: &Pitch) -> i32 {
    pitch.number().div_euclid(OCTAVE) - 1
}

fn placement_is_valid(name: PitchName, octave: i32) -> bool {
    if !(0..=MAX_OCTAVE as i32).contains(&octave) {
        return false;
    }
    let number = 12 * (octave + 1) + name.offset();
    (0..=MAX_PITCH_NUMBER).contains(&number)
}

/// Choose an octave for `name` that lands closest to `reference`.
///
/// Candidates are the reference's octave, one below and one above, in that
/// order; candidates outside octaves 0-9 or pitch numbers 0-127 are skipped
/// and ties keep the earlier candidate. If none is valid the reference
/// octave is clamped into range and lowered until the pitch fits.
pub fn best_octave_for(reference: &Pitch, name: PitchName) -> u8 {
    let reference_number = reference.number();
    let reference_octave = sounding_octave(reference);

    let mut best: Option<(i32, i32)> = None;
    for octave in [reference_octave, reference_octave - 1, reference_octave + 1] {
        if !placement_is_valid(name, octave) {
            continue;
        }
        let number = 12 * (octave + 1) + name.offset();
        let distance = (number - reference_number).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((octave, distance));
        }
    }

    match best {
        Some((octave, _)) => octave as u8,
        None => clamp_octave(name, reference_octave),
    }
}

fn clamp_octave(name: PitchName, octave: i32) -> u8 {
    let mut octave = octave.clamp(0, MAX_OCTAVE as i32);
    while octave > 0 && !placement_is_valid(name, octave) {
        octave -= 1;
    }
    octave as u8
}

/// Attach an octave to an octave-less candidate, following `previous`.
///
/// A rest candidate is returned unchanged, and a candidate following a rest
/// goes to octave 4.
pub fn assign_best_octave(previous: &Token, candidate: &Token) -> Token {
    let pitch = match candidate.sound {
        Sound::Rest => return *candidate,
        Sound::Note(pitch) => pitch,
    };
    let octave = match previous.pitch() {
        None => DEFAULT_OCTAVE,
        Some(reference) => best_octave_for(reference, pitch.name),
    };
    Token::note(pitch.with_octave(octave), candidate.duration)
}

/// A token expressed against a chord root instead of as an absolute pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeToken {
    Rest(Duration),
    Degree { interval: u8, duration: Duration },
}

impl RelativeToken {
    pub fn duration(&self) -> Duration {
        match self {
            RelativeToken::Rest(duration) => *duration,
            RelativeToken::Degree { duration, .. } => *duration,
        }
    }
}

impl fmt::Display for RelativeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeToken::Rest(duration) => write!(f, "r:{}", duration),
            RelativeToken::Degree { interval, duration } => write!(f, "{}:{}", interval, duration),
        }
    }
}

impl FromStr for RelativeToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedRelativeToken { token: s.to_string() };
        let (degree, duration) = s.trim().split_once(':').ok_or_else(malformed)?;
        let duration: Duration = duration.parse().map_err(|_| malformed())?;
        if degree.eq_ignore_ascii_case("r") {
            return Ok(RelativeToken::Rest(duration));
        }
        let interval: u8 = degree.parse().map_err(|_| malformed())?;
        if interval as i32 >= OCTAVE {
            return Err(malformed());
        }
        Ok(RelativeToken::Degree { interval, duration })
    }
}

/// Express `token` as semitones above `root` (`e4:4` over C -> `4:4`)
pub fn to_relative(token: &Token, root: PitchClass) -> RelativeToken {
    match token.sound {
        Sound::Rest => RelativeToken::Rest(token.duration),
        Sound::Note(pitch) => RelativeToken::Degree {
            interval: pitch.class().interval_above(root),
            duration: token.duration,
        },
    }
}

/// Turn a relative token back into an absolute one over `root`.
///
/// The pitch class is spelled canonically and placed in the octave nearest
/// to `previous`.
pub fn from_relative(relative: &RelativeToken, root: PitchClass, previous: &Token) -> Token {
    match *relative {
        RelativeToken::Rest(duration) => Token::rest(duration),
        RelativeToken::Degree { interval, duration } => {
            let name = root.transpose(interval as i32).spelling();
            let candidate = Token::note(Pitch::new(name, None), duration);
            assign_best_octave(previous, &candidate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tok(s: &str) -> Token {
        s.parse().unwrap()
    }

    #[test]
    fn test_strip_octave() {
        assert_eq!(strip_octave(&tok("c5:8")).to_string(), "c:8");
        assert_eq!(strip_octave(&tok("r:8")).to_string(), "r:8");
        assert_eq!(strip_octave(&tok("f#2:4.5")).to_string(), "f#:4.5");
    }

    #[test]
    fn test_add_default_octave() {
        assert_eq!(add_default_octave(&tok("c:8")).to_string(), "c4:8");
        assert_eq!(add_default_octave(&tok("c6:8")).to_string(), "c6:8");
        assert_eq!(add_default_octave(&tok("r:2")).to_string(), "r:2");
    }

    #[test]
    fn test_component_views() {
        let t = tok("Eb5:8.5");
        assert_eq!(pitch_only(&t).to_string(), "eb5");
        assert_eq!(pitch_class_only(&t).to_string(), "eb");
        assert_eq!(rhythm_only(&t).to_string(), "8.5");
        assert_eq!(pitch_class_only(&tok("r:2")).to_string(), "r");
        assert_eq!(PitchName::from_class(PitchClass::from_semitones(8)).to_string(), "ab");
    }

    #[test]
    fn test_spelling_table() {
        let names: Vec<String> = (0..12)
            .map(|pc| PitchClass::from_semitones(pc).spelling().to_string())
            .collect();
        assert_eq!(names, ["c", "c#", "d", "eb", "e", "f", "f#", "g", "ab", "a", "bb", "b"]);
    }

    #[test]
    fn test_pitch_from_number() {
        assert_eq!(pitch_from_number(60).unwrap().to_string(), "c4");
        assert_eq!(pitch_from_number(70).unwrap().to_string(), "bb4");
        assert_eq!(pitch_from_number(12).unwrap().to_string(), "c0");
        assert!(pitch_from_number(128).is_none());
        assert!(pitch_from_number(5).is_none());
    }

    #[test]
    fn test_to_relative() {
        assert_eq!(to_relative(&tok("e4:4"), PitchClass::from_semitones(0)).to_string(), "4:4");
        assert_eq!(to_relative(&tok("c5:8"), PitchClass::from_semitones(9)).to_string(), "3:8");
        assert_eq!(to_relative(&tok("r:8"), PitchClass::from_semitones(7)).to_string(), "r:8");
    }

    #[test]
    fn test_from_relative() {
        let g = PitchClass::from_semitones(7);
        let rel: RelativeToken = "4:4".parse().unwrap();
        assert_eq!(from_relative(&rel, g, &tok("a4:4")).to_string(), "b4:4");
        let rest: RelativeToken = "r:8".parse().unwrap();
        assert_eq!(from_relative(&rest, g, &tok("a4:4")).to_string(), "r:8");
    }

    #[test]
    fn test_relative_parse_rejects_out_of_range() {
        assert!("12:4".parse::<RelativeToken>().is_err());
        assert!("c4:4".parse::<RelativeToken>().is_err());
        assert!("3".parse::<RelativeToken>().is_err());
    }

    #[test]
    fn test_assign_best_octave_picks_nearest() {
        assert_eq!(assign_best_octave(&tok("c4:4"), &tok("d:4")).to_string(), "d4:4");
        assert_eq!(assign_best_octave(&tok("c4:4"), &tok("b:8")).to_string(), "b3:8");
        assert_eq!(assign_best_octave(&tok("b4:4"), &tok("c:8")).to_string(), "c5:8");
    }

    #[test]
    fn test_assign_best_octave_ties_keep_same_octave() {
        // f#3 and f#4 are both 6 semitones from c4
        assert_eq!(assign_best_octave(&tok("c4:4"), &tok("f#:4")).to_string(), "f#4:4");
    }

    #[test]
    fn test_assign_best_octave_rests() {
        assert_eq!(assign_best_octave(&tok("r:8"), &tok("e:4")).to_string(), "e4:4");
        assert_eq!(assign_best_octave(&tok("c4:4"), &tok("r:4")).to_string(), "r:4");
    }

    #[test]
    fn test_assign_best_octave_respects_range() {
        // a9 would be pitch 129
        assert_eq!(assign_best_octave(&tok("g9:4"), &tok("a:4")).to_string(), "a8:4");
        // no octave -1 below c0
        assert_eq!(assign_best_octave(&tok("c0:4"), &tok("b:4")).to_string(), "b0:4");
    }

    #[test]
    fn test_clamp_when_no_candidate_fits() {
        assert_eq!(clamp_octave(PitchName::new(Letter::B, None), 11), 8);
        assert_eq!(clamp_octave(PitchName::new(Letter::C, None), 11), 9);
    }

    proptest! {
        #[test]
        fn prop_strip_then_default_keeps_class_and_duration(pc in 0i32..12, octave in 0u8..=9, den in 1u32..=32, dotted in any::<bool>()) {
            let name = PitchClass::from_semitones(pc).spelling();
            let original = Token::note(Pitch::new(name, Some(octave)), Duration::new(den, dotted).unwrap());
            let restored = add_default_octave(&strip_octave(&original));
            prop_assert_eq!(restored.pitch().unwrap().class(), original.pitch().unwrap().class());
            prop_assert_eq!(restored.duration, original.duration);
        }

        #[test]
        fn prop_relative_round_trip_keeps_class(pc in 0i32..12, root in 0i32..12, octave in 0u8..=8, prev in 24i32..=108) {
            let name = PitchClass::from_semitones(pc).spelling();
            let original = Token::note(Pitch::new(name, Some(octave)), Duration::QUARTER);
            let root = PitchClass::from_semitones(root);
            let previous = Token::note(pitch_from_number(prev).unwrap(), Duration::EIGHTH);
            let back = from_relative(&to_relative(&original, root), root, &previous);
            prop_assert_eq!(back.pitch().unwrap().class(), original.pitch().unwrap().class());
        }

        #[test]
        fn prop_best_octave_is_nearest_candidate(pc in 0i32..12, prev in 12i32..=127) {
            let reference = pitch_from_number(prev).unwrap();
            let name = PitchClass::from_semitones(pc).spelling();
            let chosen = best_octave_for(&reference, name) as i32;
            let chosen_number = 12 * (chosen + 1) + name.offset();
            let base = sounding_octave(&reference);
            prop_assert!((chosen - base).abs() <= 1);
            prop_assert!(chosen_number <= MAX_PITCH_NUMBER);
            for octave in [base, base - 1, base + 1] {
                if placement_is_valid(name, octave) {
                    let number = 12 * (octave + 1) + name.offset();
                    prop_assert!((chosen_number - prev).abs() <= (number - prev).abs());
                }
            }
        }
    }
}
