//! Real-time playback: look-ahead scheduling against an injected clock.
//!
//! [`TransportController`] is the public surface. Underneath, one
//! [`LookaheadScheduler`] is ticked either by a [`Driver`] thread or by the
//! caller, reads live settings from [`Controls`], and hands due events to a
//! [`SoundTrigger`].

pub mod clock;
pub mod controls;
pub mod diagnostics;
pub mod driver;
pub mod scheduler;
pub mod session;
pub mod transport;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controls::Controls;
pub use diagnostics::{Diagnostics, DiagnosticsSnapshot};
pub use driver::Driver;
pub use scheduler::{intensity_scale, LookaheadScheduler, SchedulerState, TickReport, GHOST_GATE};
pub use session::PlaybackSession;
pub use transport::TransportController;
pub use trigger::{
    ConsoleTrigger, RecordedTrigger, RecordingTrigger, SoundTrigger, TriggerHandle, TriggerLog,
    TriggerRequest,
};
