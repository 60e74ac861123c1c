//! Standard MIDI file output for token melodies
//!
//! Tokens become [`NoteEvent`]s (a length in quarter notes and an optional
//! pitch number), and [`MidiWriter`] lays those out on a single track with
//! an optional swung eighth-note feel.

pub mod events;
pub mod writer;

pub use events::{events_from_text, events_from_tokens, NoteEvent};
pub use writer::{apply_swing, MidiWriter};
