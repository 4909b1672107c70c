//! Declarative accompaniment description and its compiler.
//!
//! A [`Style`] maps voices to rhythmic [`Grid`]s, a [`ChordProgression`]
//! supplies harmony, and the [`PatternCompiler`] turns both into one loop of
//! time-ordered [`Event`](crate::event::Event)s.

pub mod compile;
pub mod feel;
pub mod grid;
pub mod progression;
pub mod style;

pub use compile::{
    Arrangement, CompileOptions, CompiledPattern, PatternCompiler, DEFAULT_HUMANIZE_CEILING,
};
pub use feel::{swing_offset, Humanizer, MAX_SWING};
pub use grid::{Grid, GridSymbol, Subdivision};
pub use progression::ChordProgression;
pub use style::{PitchedPart, PlayMode, Style, StyleBook, StyleSpec, VoiceDef, VoiceSpec};
