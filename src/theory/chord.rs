//! Chord symbols: Parsing and resolution to concrete pitches.
//!
//! Parses symbols such as `C`, `Am7`, `F#dim`, `Bbmaj7`, `G7sus4` and slash
//! chords like `C/E` into a [`Chord`], then places it in an octave and runs a
//! [`Voicing`] over it.

use super::note::{midi_note, parse_pitch_class};
use super::voicing::{Voicing, VoicingContext};
use crate::error::ChordError;

/// Chord quality, as intervals above the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Major7,
    Minor7,
    Diminished,
    Diminished7,
    HalfDiminished,
    Augmented,
    Sus2,
    Sus4,
    Dominant7Sus4,
    Major6,
    Minor6,
    Dominant9,
    Major9,
    Minor9,
    Add9,
}

impl ChordQuality {
    /// Parse the part of a symbol after the root. `None` for unknown qualities.
    pub fn parse(s: &str) -> Option<Self> {
        let quality = match s {
            "" | "maj" | "M" | "major" => ChordQuality::Major,
            "m" | "min" | "-" | "minor" => ChordQuality::Minor,
            "7" | "dom7" => ChordQuality::Dominant7,
            "maj7" | "M7" | "Δ" | "Δ7" => ChordQuality::Major7,
            "m7" | "min7" | "-7" => ChordQuality::Minor7,
            "dim" | "°" | "o" => ChordQuality::Diminished,
            "dim7" | "°7" | "o7" => ChordQuality::Diminished7,
            "m7b5" | "ø" | "ø7" => ChordQuality::HalfDiminished,
            "aug" | "+" => ChordQuality::Augmented,
            "sus2" => ChordQuality::Sus2,
            "sus4" | "sus" => ChordQuality::Sus4,
            "7sus4" | "7sus" => ChordQuality::Dominant7Sus4,
            "6" => ChordQuality::Major6,
            "m6" | "min6" => ChordQuality::Minor6,
            "9" => ChordQuality::Dominant9,
            "maj9" | "M9" => ChordQuality::Major9,
            "m9" | "min9" => ChordQuality::Minor9,
            "add9" => ChordQuality::Add9,
            _ => return None,
        };
        Some(quality)
    }

    /// Semitone intervals above the root, ascending.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::HalfDiminished => &[0, 3, 6, 10],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Dominant7Sus4 => &[0, 5, 7, 10],
            ChordQuality::Major6 => &[0, 4, 7, 9],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
            ChordQuality::Dominant9 => &[0, 4, 7, 10, 14],
            ChordQuality::Major9 => &[0, 4, 7, 11, 14],
            ChordQuality::Minor9 => &[0, 3, 7, 10, 14],
            ChordQuality::Add9 => &[0, 4, 7, 14],
        }
    }
}

/// A parsed chord symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    /// Root pitch class (0–11).
    pub root: u8,
    pub quality: ChordQuality,
    /// Slash-chord bass pitch class.
    pub bass: Option<u8>,
    /// Whether the quality text was recognized (unknown qualities fall back to major).
    pub recognized: bool,
}

impl Chord {
    /// Parse a chord symbol.
    ///
    /// An unknown quality is not an error: the chord falls back to a major
    /// triad on the stated root and `recognized` is false.
    pub fn parse(symbol: &str) -> Result<Self, ChordError> {
        let symbol = symbol.trim();
        let invalid = || ChordError::InvalidChordSymbol(symbol.to_string());

        let (head, bass_text) = match symbol.split_once('/') {
            Some((head, bass)) => (head, Some(bass)),
            None => (symbol, None),
        };

        let (root, consumed) = parse_pitch_class(head).ok_or_else(invalid)?;

        let bass = match bass_text {
            Some(text) => match parse_pitch_class(text) {
                Some((pc, used)) if used == text.len() => Some(pc),
                _ => return Err(invalid()),
            },
            None => None,
        };

        let quality_text = &head[consumed..];
        let (quality, recognized) = match ChordQuality::parse(quality_text) {
            Some(q) => (q, true),
            None => (ChordQuality::Major, false),
        };

        Ok(Self {
            root,
            quality,
            bass,
            recognized,
        })
    }

    /// Root-position pitches with the root in `octave`, slash bass (if any) underneath.
    pub fn tones(&self, octave: i8) -> Vec<u8> {
        let root_midi = midi_note(self.root, octave);
        let mut tones: Vec<u8> = self
            .quality
            .intervals()
            .iter()
            .map(|&i| (root_midi as u16 + i as u16).min(127) as u8)
            .collect();

        if let Some(bass_pc) = self.bass {
            if bass_pc != self.root {
                tones.retain(|&t| t % 12 != bass_pc);
                let mut bass = midi_note(bass_pc, octave);
                while bass >= root_midi && bass >= 12 {
                    bass -= 12;
                }
                tones.insert(0, bass);
            }
        }
        tones
    }

    /// MIDI note of the root in `octave`.
    pub fn root_midi(&self, octave: i8) -> u8 {
        midi_note(self.root, octave)
    }
}

/// Resolves chord symbols into ordered pitches.
///
/// Pure: the same symbol, voicing and octave always yield the same pitches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordResolver;

impl ChordResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a chord symbol with a voicing in an octave.
    pub fn resolve(&self, symbol: &str, voicing: Voicing, octave: i8) -> Result<Vec<u8>, ChordError> {
        let chord = Chord::parse(symbol)?;
        Ok(self.voice(&chord, voicing, octave, None))
    }

    /// Voice an already parsed chord, optionally leading toward the next chord's root.
    pub fn voice(&self, chord: &Chord, voicing: Voicing, octave: i8, next: Option<&Chord>) -> Vec<u8> {
        let tones = chord.tones(octave);
        voicing.apply(&VoicingContext {
            tones: &tones,
            root: chord.root_midi(octave),
            next_root: next.map(|c| c.root),
        })
    }

    /// Substitute used when a chord symbol cannot be parsed: C major.
    pub fn fallback_chord() -> Chord {
        Chord {
            root: 0,
            quality: ChordQuality::Major,
            bass: None,
            recognized: true,
        }
    }
}
