//! Backbeat: A real-time accompaniment engine.
//!
//! A declarative description (style, chord progression, tempo, intensity) is
//! compiled into time-stamped events by the [`pattern`] layer and played
//! against a clock by the look-ahead scheduler in [`playback`]. Sound
//! production is left to a [`playback::SoundTrigger`] implementation.

pub mod articulation;
pub mod config;
pub mod error;
pub mod event;
pub mod pattern;
pub mod playback;
pub mod theory;

pub use articulation::{Articulation, ArticulationTable};
pub use config::EngineConfig;
pub use pattern::{Arrangement, ChordProgression, PatternCompiler, Style, StyleBook};
pub use playback::{SchedulerState, SoundTrigger, TransportController};
pub use theory::ChordResolver;
