//! Corpus text parsing
//!
//! A corpus is plain text: whitespace-separated tokens, one measure (or
//! phrase) per line, with an optional trailing chord annotation after a `|`.
//!
//! ```text
//! # Autumn Leaves, A section
//! r:8 e4:8 f#4:8 g4:8 c5:2 | Am7
//! r:8 d4:8 e4:8 f#4:8 | b4:2 | D7
//! ```
//!
//! Every `|`-delimited segment of a line belongs to the line's trailing
//! chord. Words without `:` are ignored; words with `:` that do not parse
//! are skipped with a warning.

use std::path::Path;

use crate::chord::ChordSymbol;
use crate::error::Result;
use crate::pitch::PitchClass;
use crate::token::Token;

const CHORD_DELIMITER: char = '|';

/// One corpus line: its tokens and the chord annotation, if any
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusLine {
    pub tokens: Vec<Token>,
    pub chord: Option<ChordSymbol>,
}

/// A token together with the root of the chord its line was annotated with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedToken {
    pub token: Token,
    pub root: PitchClass,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    lines: Vec<CorpusLine>,
    skipped: usize,
}

impl Corpus {
    pub fn parse(text: &str) -> Result<Self> {
        let mut corpus = Corpus::default();
        for (number, line) in text.lines().enumerate() {
            let (body, chord) = split_annotation(line)?;
            let mut tokens = Vec::new();
            for segment in body {
                for word in segment.split_whitespace() {
                    if !Token::looks_like_token(word) {
                        continue;
                    }
                    match word.parse::<Token>() {
                        Ok(token) => tokens.push(token),
                        Err(e) => {
                            tracing::warn!("Skipping token on line {}: {}", number + 1, e);
                            corpus.skipped += 1;
                        }
                    }
                }
            }
            corpus.lines.push(CorpusLine { tokens, chord });
        }
        tracing::debug!(
            "Parsed corpus: {} lines, {} tokens, {} chords, {} skipped",
            corpus.lines.len(),
            corpus.token_count(),
            corpus.chords().len(),
            corpus.skipped
        );
        Ok(corpus)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn lines(&self) -> &[CorpusLine] {
        &self.lines
    }

    /// Number of words that looked like tokens but failed to parse
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn token_count(&self) -> usize {
        self.lines.iter().map(|l| l.tokens.len()).sum()
    }

    /// Every valid token, in order, across all lines
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.lines.iter().flat_map(|l| l.tokens.iter())
    }

    /// The chord sequence, one entry per annotated line
    pub fn chords(&self) -> Vec<ChordSymbol> {
        self.lines.iter().filter_map(|l| l.chord.clone()).collect()
    }

    /// Tokens of annotated lines only, each tagged with its line's root
    pub fn annotated(&self) -> impl Iterator<Item = AnnotatedToken> + '_ {
        self.lines.iter().flat_map(|line| {
            let root = line.chord.as_ref().map(ChordSymbol::root);
            line.tokens
                .iter()
                .filter_map(move |&token| root.map(|root| AnnotatedToken { token, root }))
        })
    }
}

/// Split a line into token segments and its trailing chord annotation.
///
/// Blank segments at the end of the line are dropped first, so `... | C |`
/// still carries chord `C`. A line with no `|`, or with nothing left after
/// its first segment, has no chord and all of its text is token material.
fn split_annotation(line: &str) -> Result<(Vec<&str>, Option<ChordSymbol>)> {
    let mut segments: Vec<&str> = line.split(CHORD_DELIMITER).collect();
    while segments.len() > 1 && segments.last().map_or(false, |s| s.trim().is_empty()) {
        segments.pop();
    }
    if segments.len() < 2 {
        return Ok((segments, None));
    }
    let chord = match segments.pop() {
        Some(last) => last.parse::<ChordSymbol>()?,
        None => return Ok((segments, None)),
    };
    Ok((segments, Some(chord)))
}

/// Strictly read every token-like word of `text`.
///
/// Unlike [`Corpus::parse`], a malformed token is an error. Chord
/// annotations and comments carry no `:` and are passed over.
pub fn scan_tokens(text: &str) -> Result<Vec<Token>> {
    text.split_whitespace()
        .filter(|word| Token::looks_like_token(word))
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SAMPLE: &str = "\
# two measures in C
c4:4 e4:4 g4:4 c5:4 | C
d4:8 f4:8 a4:4 | g4:2 | G7
r:4 b3:4 c4:2
";

    #[test]
    fn test_lines_and_chords() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        assert_eq!(corpus.lines().len(), 4);
        let chords: Vec<String> = corpus.chords().iter().map(|c| c.to_string()).collect();
        assert_eq!(chords, ["C", "G7"]);
        assert_eq!(corpus.token_count(), 11);
        assert_eq!(corpus.skipped(), 0);
    }

    #[test]
    fn test_all_segments_belong_to_trailing_chord() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        let second = &corpus.lines()[2];
        assert_eq!(second.tokens.len(), 4);
        assert_eq!(second.chord.as_ref().unwrap().root().value(), 7);
    }

    #[test]
    fn test_annotated_skips_unannotated_lines() {
        let corpus = Corpus::parse(SAMPLE).unwrap();
        let annotated: Vec<AnnotatedToken> = corpus.annotated().collect();
        assert_eq!(annotated.len(), 8);
        assert_eq!(annotated[0].root.value(), 0);
        assert_eq!(annotated[7].root.value(), 7);
        assert_eq!(annotated[7].token.to_string(), "g4:2");
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let corpus = Corpus::parse("c4:4 x9:4 e4:4 c4:0 g4:4 | C").unwrap();
        assert_eq!(corpus.token_count(), 3);
        assert_eq!(corpus.skipped(), 2);
    }

    #[test]
    fn test_trailing_bar_without_chord() {
        let corpus = Corpus::parse("c4:4 d4:4 |").unwrap();
        assert!(corpus.chords().is_empty());
        assert_eq!(corpus.token_count(), 2);
    }

    #[test]
    fn test_trailing_bars_after_chord_are_ignored() {
        let corpus = Corpus::parse("c4:4 d4:4 | C |\ne4:4 | G7 | | ").unwrap();
        let chords: Vec<String> = corpus.chords().iter().map(|c| c.to_string()).collect();
        assert_eq!(chords, ["C", "G7"]);
        assert_eq!(corpus.token_count(), 3);
    }

    #[test]
    fn test_unresolvable_chord_is_fatal() {
        assert!(matches!(Corpus::parse("c4:4 | N.C."), Err(Error::UnresolvableChord(_))));
    }

    #[test]
    fn test_scan_tokens_is_strict() {
        assert_eq!(scan_tokens("c4:4 | C\nr:8").unwrap().len(), 2);
        assert!(scan_tokens("c4:4 q:4").is_err());
    }
}
