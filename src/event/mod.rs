//! Musical time and the event stream.
//!
//! [`Beat`] is integer musical time, [`Tempo`] and [`TimeSignature`] turn it
//! into seconds and bars, [`Event`] is what the pattern compiler emits, and
//! [`Timeline`] is the cursor-driven store the scheduler scans each step.

pub mod beat;
pub mod meter;
pub mod timeline;
pub mod types;

pub use beat::{Beat, TICKS_PER_BEAT};
pub use meter::{Tempo, TimeSignature, MAX_BPM, MIN_BPM};
pub use timeline::Timeline;
pub use types::{Event, PitchSpec};
