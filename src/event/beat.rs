//! Musical time representation using integer ticks.
//!
//! Uses 960 PPQN (Pulses Per Quarter Note) so straight and triplet
//! subdivisions, swing offsets and humanization nudges all land on exact
//! integer positions. Conversion to seconds happens only at the scheduling
//! boundary, always with the tempo that is current at that moment.

use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// Ticks per quarter note (beat). 960 divides cleanly by 2, 3, 4, 5, 6, 8,
/// 10, 12, 15, 16, 20, 24, 32, etc.
pub const TICKS_PER_BEAT: u64 = 960;

/// Musical time measured in integer ticks at [`TICKS_PER_BEAT`] resolution.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct Beat {
    ticks: u64,
}

impl Beat {
    /// The start of the loop.
    pub const ZERO: Beat = Beat { ticks: 0 };

    /// Create a `Beat` from a raw tick count.
    pub fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Create a `Beat` from whole beats (quarter notes).
    pub fn from_beats(beats: u32) -> Self {
        Self {
            ticks: beats as u64 * TICKS_PER_BEAT,
        }
    }

    /// Create a `Beat` from a fractional beat value (e.g. 1.5 = one and a half beats).
    ///
    /// Negative inputs saturate at zero.
    pub fn from_beats_f64(beats: f64) -> Self {
        Self {
            ticks: (beats * TICKS_PER_BEAT as f64).round().max(0.0) as u64,
        }
    }

    /// Return the raw tick count.
    pub fn ticks(self) -> u64 {
        self.ticks
    }

    /// Convert to a floating-point beat value.
    pub fn as_beats_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_BEAT as f64
    }

    /// Convert this span of musical time to seconds at the given tempo.
    pub fn to_seconds(self, bpm: f64) -> f64 {
        self.as_beats_f64() * 60.0 / bpm
    }

    /// Shift by a signed tick offset, saturating at zero.
    pub fn offset_by(self, ticks: i64) -> Self {
        Self {
            ticks: self.ticks.saturating_add_signed(ticks),
        }
    }

    /// Multiply a span by a whole count (e.g. step length × step index).
    pub fn times(self, count: u64) -> Self {
        Self {
            ticks: self.ticks * count,
        }
    }

    /// Quantize to the start of the enclosing bar (round down).
    pub fn quantize_to_bar(self, bar_length: Beat) -> Self {
        if bar_length.ticks == 0 {
            return self;
        }
        Self {
            ticks: (self.ticks / bar_length.ticks) * bar_length.ticks,
        }
    }
}

impl Ord for Beat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ticks.cmp(&other.ticks)
    }
}

impl PartialOrd for Beat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Beat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks + rhs.ticks,
        }
    }
}

impl Sub for Beat {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks.saturating_sub(rhs.ticks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_zero_ticks() {
        assert_eq!(Beat::ZERO.ticks(), 0);
        assert_eq!(Beat::default(), Beat::ZERO);
    }

    #[test]
    fn from_beats_converts_correctly() {
        assert_eq!(Beat::from_beats(1).ticks(), TICKS_PER_BEAT);
        assert_eq!(Beat::from_beats(4).ticks(), 4 * TICKS_PER_BEAT);
    }

    #[test]
    fn from_beats_f64_fractional() {
        assert_eq!(Beat::from_beats_f64(0.25).ticks(), TICKS_PER_BEAT / 4);
        assert_eq!(
            Beat::from_beats_f64(1.5).ticks(),
            TICKS_PER_BEAT + TICKS_PER_BEAT / 2
        );
    }

    #[test]
    fn from_beats_f64_negative_saturates() {
        assert_eq!(Beat::from_beats_f64(-0.5), Beat::ZERO);
    }

    #[test]
    fn to_seconds_at_120_bpm() {
        // One beat at 120 BPM is half a second.
        assert!((Beat::from_beats(1).to_seconds(120.0) - 0.5).abs() < 1e-12);
        assert!((Beat::from_beats(3).to_seconds(120.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn to_seconds_at_60_bpm() {
        assert!((Beat::from_beats_f64(0.25).to_seconds(60.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn offset_by_signed() {
        let b = Beat::from_beats(1);
        assert_eq!(b.offset_by(10).ticks(), TICKS_PER_BEAT + 10);
        assert_eq!(b.offset_by(-10).ticks(), TICKS_PER_BEAT - 10);
        assert_eq!(Beat::from_ticks(5).offset_by(-10), Beat::ZERO);
    }

    #[test]
    fn times_scales_span() {
        let sixteenth = Beat::from_ticks(TICKS_PER_BEAT / 4);
        assert_eq!(sixteenth.times(4), Beat::from_beats(1));
    }

    #[test]
    fn subtraction_saturates() {
        let a = Beat::from_beats(1);
        let b = Beat::from_beats(3);
        assert_eq!((a - b).ticks(), 0);
    }

    #[test]
    fn quantize_to_bar_rounds_down() {
        let bar = Beat::from_beats(4);
        let pos = Beat::from_ticks(5 * TICKS_PER_BEAT + TICKS_PER_BEAT / 2);
        assert_eq!(pos.quantize_to_bar(bar), Beat::from_beats(4));
    }

    #[test]
    fn quantize_to_compound_bar() {
        // 6/8: a bar is three quarter-note beats long.
        let bar = Beat::from_beats(3);
        assert_eq!(Beat::from_beats(7).quantize_to_bar(bar), Beat::from_beats(6));
        assert_eq!(Beat::from_beats(6).quantize_to_bar(bar), Beat::from_beats(6));
    }
}
