//! Voicing styles and voice classes.
//!
//! A voicing is a pure function from a chord's ordered pitches to the
//! sequence a part actually plays.

use serde::{Deserialize, Serialize};

/// How a chord is turned into a pitch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voicing {
    /// Chord tones in root position (slash bass lowest).
    #[default]
    Root,
    /// Lowest tone plus the chord's fifth above it.
    RootFifth,
    /// Up to three chord tones, then one approach tone into the next chord's root.
    Walking,
    /// Root–third–fifth–third.
    Arpeggio,
    /// Lowest tone and the same tone an octave up.
    Octaves,
    /// Lowest tone only.
    Pedal,
}

/// Register a part lives in; fixes the default octave so output is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceClass {
    #[default]
    Bass,
    Comp,
    Lead,
}

impl VoiceClass {
    pub fn default_octave(self) -> i8 {
        match self {
            VoiceClass::Bass => 2,
            VoiceClass::Comp => 4,
            VoiceClass::Lead => 5,
        }
    }
}

/// Input to a voicing.
#[derive(Debug, Clone, Copy)]
pub struct VoicingContext<'a> {
    /// Ordered chord pitches, lowest first.
    pub tones: &'a [u8],
    /// MIDI note of the chord root (may differ from `tones[0]` for slash chords).
    pub root: u8,
    /// Pitch class of the next chord's root, if known.
    pub next_root: Option<u8>,
}

impl Voicing {
    pub fn apply(self, ctx: &VoicingContext<'_>) -> Vec<u8> {
        let Some(&lowest) = ctx.tones.first() else {
            return Vec::new();
        };
        match self {
            Voicing::Root => ctx.tones.to_vec(),
            Voicing::RootFifth => {
                let mut fifth = ctx.root as u16 + 7;
                while fifth <= lowest as u16 {
                    fifth += 12;
                }
                vec![lowest, fifth.min(127) as u8]
            }
            Voicing::Walking => {
                let mut line: Vec<u8> = ctx.tones.iter().take(3).copied().collect();
                let last = line[line.len() - 1];
                let target = match ctx.next_root {
                    Some(pc) => nearest_with_pitch_class(lowest, pc),
                    None => lowest,
                };
                line.push(approach_tone(target, last));
                line
            }
            Voicing::Arpeggio => [0usize, 1, 2, 1]
                .iter()
                .map(|&i| ctx.tones[i % ctx.tones.len()])
                .collect(),
            Voicing::Octaves => vec![lowest, lowest.saturating_add(12).min(127)],
            Voicing::Pedal => vec![lowest],
        }
    }
}

/// The note with pitch class `pc` closest to `anchor` (ties resolve upward).
fn nearest_with_pitch_class(anchor: u8, pc: u8) -> u8 {
    let up = (pc as i32 - anchor as i32).rem_euclid(12);
    let candidate = if up <= 6 {
        anchor as i32 + up
    } else {
        anchor as i32 + up - 12
    };
    let candidate = if candidate > 127 { candidate - 12 } else { candidate };
    candidate.clamp(0, 127) as u8
}

/// A chromatic neighbour leading into `target` from the side `from` sits on,
/// or a whole step above when the line is already on the target.
fn approach_tone(target: u8, from: u8) -> u8 {
    if target > from {
        target - 1
    } else if target < from {
        target.saturating_add(1).min(127)
    } else {
        target.saturating_add(2).min(127)
    }
}
