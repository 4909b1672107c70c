//! Event data model: The unit the compiler produces and the scheduler consumes.
//!
//! An [`Event`] is one hit or note for one voice at a point in musical time,
//! with velocity, duration and an articulation tag that is only interpreted at
//! trigger time.

use std::fmt;

use super::beat::Beat;
use crate::articulation::Articulation;
use crate::theory::note::note_name;

/// What the event sounds: a pitched note or an unpitched hit on the voice itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchSpec {
    /// MIDI note number (0–127).
    Note(u8),
    /// Unpitched trigger (drum voices).
    Hit,
}

impl PitchSpec {
    /// Transpose a note by `semitones`, clamped to the MIDI range. Hits are unchanged.
    pub fn shifted(self, semitones: i8) -> Self {
        match self {
            PitchSpec::Note(n) => PitchSpec::Note((n as i16 + semitones as i16).clamp(0, 127) as u8),
            PitchSpec::Hit => PitchSpec::Hit,
        }
    }
}

impl fmt::Display for PitchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PitchSpec::Note(n) => f.write_str(&note_name(*n)),
            PitchSpec::Hit => f.write_str("hit"),
        }
    }
}

/// A single compiled event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Voice that plays the event (e.g. "kick", "bass").
    pub voice: String,
    /// What to play.
    pub pitch: PitchSpec,
    /// When the event starts, in musical time from the loop start.
    pub time: Beat,
    /// How long it sounds before articulation scaling.
    pub duration: Beat,
    /// Velocity in the range 0.0–1.0.
    pub velocity: f32,
    pub articulation: Articulation,
}

impl Event {
    /// Create an unpitched hit.
    pub fn hit(time: Beat, duration: Beat, voice: &str, velocity: f32) -> Self {
        Self {
            voice: voice.to_string(),
            pitch: PitchSpec::Hit,
            time,
            duration,
            velocity,
            articulation: Articulation::Normal,
        }
    }

    /// Create a pitched note.
    pub fn note(time: Beat, duration: Beat, voice: &str, note: u8, velocity: f32) -> Self {
        Self {
            voice: voice.to_string(),
            pitch: PitchSpec::Note(note),
            time,
            duration,
            velocity,
            articulation: Articulation::Normal,
        }
    }

    pub fn with_articulation(mut self, articulation: Articulation) -> Self {
        self.articulation = articulation;
        self
    }

    /// The name handed to the sound collaborator: the note name for pitched
    /// events, the voice name for hits.
    pub fn pitch_or_note_name(&self) -> String {
        match self.pitch {
            PitchSpec::Note(n) => note_name(n),
            PitchSpec::Hit => self.voice.clone(),
        }
    }
}
