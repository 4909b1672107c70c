//! Counters for recoverable conditions.
//!
//! Nothing in the musical data may stop playback, so problems are logged and
//! counted here instead of surfacing as errors.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Diagnostics {
    chord_substitutions: AtomicU64,
    unknown_voices: AtomicU64,
    trigger_failures: AtomicU64,
    dropped_late: AtomicU64,
    skipped_ticks: AtomicU64,
    triggered: AtomicU64,
}

/// A point-in-time copy of [`Diagnostics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub chord_substitutions: u64,
    pub unknown_voices: u64,
    pub trigger_failures: u64,
    pub dropped_late: u64,
    pub skipped_ticks: u64,
    pub triggered: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_chord_substitutions(&self, count: u64) {
        self.chord_substitutions.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_unknown_voice(&self) {
        self.unknown_voices.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_trigger_failure(&self) {
        self.trigger_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_late(&self) {
        self.dropped_late.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_ticks(&self, count: u64) {
        self.skipped_ticks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_triggered(&self) {
        self.triggered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            chord_substitutions: self.chord_substitutions.load(Ordering::Relaxed),
            unknown_voices: self.unknown_voices.load(Ordering::Relaxed),
            trigger_failures: self.trigger_failures.load(Ordering::Relaxed),
            dropped_late: self.dropped_late.load(Ordering::Relaxed),
            skipped_ticks: self.skipped_ticks.load(Ordering::Relaxed),
            triggered: self.triggered.load(Ordering::Relaxed),
        }
    }
}
