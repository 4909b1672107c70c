//! Music theory helpers: note names, chord symbols and voicings.

pub mod chord;
pub mod note;
pub mod voicing;

pub use chord::{Chord, ChordQuality, ChordResolver};
pub use note::note_name;
pub use voicing::{VoiceClass, Voicing, VoicingContext};
