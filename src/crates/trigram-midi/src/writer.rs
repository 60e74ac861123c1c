// Standard MIDI file writing.
//
// Output is SMF Format 1 with a single track: a tempo meta event at tick 0
// followed by note on/off pairs. Rests only advance the clock.

use anyhow::{Context, Result};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::Path;

use crate::events::NoteEvent;

pub const DEFAULT_TICKS_PER_QUARTER: u16 = 480;
pub const DEFAULT_VELOCITY: u8 = 80;
pub const DEFAULT_TEMPO_BPM: u32 = 120;

/// Move a tick in the second half of its beat to two thirds of the beat.
///
/// Straight eighths become a long-short pair; downbeat positions are left
/// alone.
pub fn apply_swing(tick: u64, ticks_per_quarter: u64) -> u64 {
    let position = tick % ticks_per_quarter;
    if position >= ticks_per_quarter / 2 {
        let beat_start = tick - position;
        beat_start + ticks_per_quarter * 2 / 3
    } else {
        tick
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidiWriter {
    pub tempo_bpm: u32,
    pub ticks_per_quarter: u16,
    pub velocity: u8,
    pub channel: u8,
    pub swing: bool,
}

impl Default for MidiWriter {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO_BPM,
            ticks_per_quarter: DEFAULT_TICKS_PER_QUARTER,
            velocity: DEFAULT_VELOCITY,
            channel: 0,
            swing: true,
        }
    }
}

impl MidiWriter {
    pub fn new(tempo_bpm: u32, swing: bool) -> Self {
        Self {
            tempo_bpm,
            swing,
            ..Self::default()
        }
    }

    fn place(&self, tick: u64) -> u64 {
        if self.swing {
            apply_swing(tick, self.ticks_per_quarter as u64)
        } else {
            tick
        }
    }

    /// Lay the events out on one track
    pub fn to_smf(&self, events: &[NoteEvent]) -> Smf<'static> {
        let ticks_per_quarter = self.ticks_per_quarter.clamp(1, 0x7fff);
        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(u15::new(ticks_per_quarter)),
        ));

        let mut track: Track<'static> = Vec::new();
        let tempo_microseconds = 60_000_000 / self.tempo_bpm.max(1);
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        });

        let channel = u4::new(self.channel.min(15));
        let velocity = u7::new(self.velocity.min(127));
        let mut straight_tick: u64 = 0;
        let mut last_tick: u64 = 0;

        for event in events {
            let length = (event.quarter_notes * ticks_per_quarter as f64).round().max(0.0) as u64;
            if let Some(pitch) = event.pitch {
                let key = u7::new(pitch.min(127));
                let start = self.place(straight_tick);
                let end = self.place(straight_tick + length);

                track.push(TrackEvent {
                    delta: u28::new((start - last_tick) as u32),
                    kind: TrackEventKind::Midi {
                        channel,
                        message: MidiMessage::NoteOn { key, vel: velocity },
                    },
                });
                track.push(TrackEvent {
                    delta: u28::new((end - start) as u32),
                    kind: TrackEventKind::Midi {
                        channel,
                        message: MidiMessage::NoteOff { key, vel: u7::new(0) },
                    },
                });
                last_tick = end;
            }
            straight_tick += length;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
        smf
    }

    /// Encode and write to `path`
    pub fn write(&self, events: &[NoteEvent], path: &Path) -> Result<()> {
        let smf = self.to_smf(events);
        let mut buf = Vec::new();
        // midly reports encoding failures as a bare &str
        smf.write(&mut buf)
            .map_err(|e| anyhow::anyhow!("Failed to encode MIDI for {}: {}", path.display(), e))?;
        std::fs::write(path, &buf).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Wrote {} events to {}", events.len(), path.display());
        Ok(())
    }
}
