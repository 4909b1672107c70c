//! Note names: pitch classes from chord roots, MIDI numbers to names.
//!
//! Octave numbering follows the C4 = 60 convention (C-1 = 0).

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch class (0–11) of a natural note letter.
pub fn letter_pitch_class(letter: char) -> Option<u8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Parse a leading pitch class with an optional accidental.
///
/// Returns the pitch class and the number of bytes consumed, e.g.
/// `"Bbm7"` → `(10, 2)`.
pub fn parse_pitch_class(s: &str) -> Option<(u8, usize)> {
    let mut chars = s.char_indices();
    let (_, letter) = chars.next()?;
    let base = letter_pitch_class(letter)? as i32;
    let mut consumed = letter.len_utf8();

    let accidental = match chars.next() {
        Some((i, c @ ('#' | '♯'))) => {
            consumed = i + c.len_utf8();
            1
        }
        Some((i, c @ ('b' | '♭'))) => {
            consumed = i + c.len_utf8();
            -1
        }
        _ => 0,
    };

    Some(((base + accidental).rem_euclid(12) as u8, consumed))
}

/// MIDI note for a pitch class in an octave, clamped to 0–127.
pub fn midi_note(pitch_class: u8, octave: i8) -> u8 {
    let midi = (octave as i32 + 1) * 12 + pitch_class as i32;
    midi.clamp(0, 127) as u8
}

/// Name of a MIDI note using sharps, e.g. 45 → "A2".
pub fn note_name(midi: u8) -> String {
    let octave = midi as i32 / 12 - 1;
    format!("{}{}", SHARP_NAMES[midi as usize % 12], octave)
}
