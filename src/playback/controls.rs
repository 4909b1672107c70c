//! Live scalars shared between the transport façade and the scheduler.
//!
//! Each setting is one atomic word so a setter never blocks on a running
//! tick: tempo and intensity are `f64` bits, humanize packs an enable bit
//! with an `f32` amount, and the meter is packed numerator/denominator.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::event::{Tempo, TimeSignature};

const HUMANIZE_ENABLED: u64 = 1 << 32;

/// Atomic live settings.
#[derive(Debug)]
pub struct Controls {
    running: AtomicBool,
    tempo: AtomicU64,
    intensity: AtomicU64,
    humanize: AtomicU64,
    meter: AtomicU32,
}

impl Controls {
    pub fn new(tempo: Tempo, intensity: f64, meter: TimeSignature) -> Self {
        Self {
            running: AtomicBool::new(false),
            tempo: AtomicU64::new(tempo.bpm().to_bits()),
            intensity: AtomicU64::new(clamp_intensity(intensity).to_bits()),
            humanize: AtomicU64::new(pack_humanize(false, 0.0)),
            meter: AtomicU32::new(meter.pack()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub fn tempo(&self) -> Tempo {
        Tempo::new(f64::from_bits(self.tempo.load(Ordering::Acquire))).unwrap_or_default()
    }

    pub fn set_tempo(&self, tempo: Tempo) {
        self.tempo.store(tempo.bpm().to_bits(), Ordering::Release);
    }

    /// Intensity level in `[0, 1]`.
    pub fn intensity(&self) -> f64 {
        f64::from_bits(self.intensity.load(Ordering::Acquire))
    }

    pub fn set_intensity(&self, level: f64) {
        self.intensity
            .store(clamp_intensity(level).to_bits(), Ordering::Release);
    }

    /// `(enabled, amount in beats)`.
    pub fn humanize(&self) -> (bool, f64) {
        unpack_humanize(self.humanize.load(Ordering::Acquire))
    }

    pub fn set_humanize(&self, enabled: bool, amount: f64) {
        self.humanize
            .store(pack_humanize(enabled, amount), Ordering::Release);
    }

    pub fn meter(&self) -> TimeSignature {
        TimeSignature::unpack(self.meter.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn set_meter(&self, meter: TimeSignature) {
        self.meter.store(meter.pack(), Ordering::Release);
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(Tempo::default(), 1.0, TimeSignature::COMMON)
    }
}

fn clamp_intensity(level: f64) -> f64 {
    if level.is_nan() {
        1.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

fn pack_humanize(enabled: bool, amount: f64) -> u64 {
    let amount: f32 = if amount.is_finite() {
        amount.max(0.0) as f32
    } else {
        0.0
    };
    let flag = if enabled { HUMANIZE_ENABLED } else { 0 };
    flag | amount.to_bits() as u64
}

fn unpack_humanize(bits: u64) -> (bool, f64) {
    let enabled = bits & HUMANIZE_ENABLED != 0;
    let amount = f32::from_bits(bits as u32) as f64;
    (enabled, amount)
}
