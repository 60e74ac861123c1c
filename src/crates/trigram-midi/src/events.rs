use trigram_core::{scan_tokens, Result, Token};

/// One note or rest, the unit the writer consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Length in quarter notes (`c4:8` is 0.5)
    pub quarter_notes: f64,
    /// Pitch number, `None` for a rest
    pub pitch: Option<u8>,
}

impl NoteEvent {
    pub fn rest(quarter_notes: f64) -> Self {
        Self {
            quarter_notes,
            pitch: None,
        }
    }

    pub fn note(pitch: u8, quarter_notes: f64) -> Self {
        Self {
            quarter_notes,
            pitch: Some(pitch),
        }
    }
}

impl From<&Token> for NoteEvent {
    fn from(token: &Token) -> Self {
        let quarter_notes = token.beats().as_f64();
        match token.pitch() {
            // Octave-less pitches sound in octave 4; b#9 and the like clamp to 127
            Some(pitch) => NoteEvent::note(pitch.number().clamp(0, 127) as u8, quarter_notes),
            None => NoteEvent::rest(quarter_notes),
        }
    }
}

pub fn events_from_tokens<'a, I>(tokens: I) -> Vec<NoteEvent>
where
    I: IntoIterator<Item = &'a Token>,
{
    tokens.into_iter().map(NoteEvent::from).collect()
}

/// Read every token of a melody or corpus file.
///
/// Chord annotations and comments are passed over; a malformed token is an
/// error.
pub fn events_from_text(text: &str) -> Result<Vec<NoteEvent>> {
    let tokens = scan_tokens(text)?;
    Ok(events_from_tokens(&tokens))
}
