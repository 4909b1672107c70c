//! Tempo and time signature: The two values that turn beats into bars and seconds.

use serde::{Deserialize, Serialize};

use super::beat::{Beat, TICKS_PER_BEAT};
use crate::error::TransportError;

/// Slowest accepted tempo.
pub const MIN_BPM: f64 = 40.0;
/// Fastest accepted tempo.
pub const MAX_BPM: f64 = 200.0;

/// Tempo in beats per minute, always inside `MIN_BPM..=MAX_BPM`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo(f64);

impl Tempo {
    /// Build a tempo, clamping finite values into range.
    ///
    /// Non-finite and non-positive values are refused.
    pub fn new(bpm: f64) -> Result<Self, TransportError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(TransportError::InvalidTempo(bpm));
        }
        Ok(Self(bpm.clamp(MIN_BPM, MAX_BPM)))
    }

    pub fn bpm(self) -> f64 {
        self.0
    }

    pub fn seconds_per_beat(self) -> f64 {
        60.0 / self.0
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(120.0)
    }
}

impl TryFrom<f64> for Tempo {
    type Error = TransportError;

    fn try_from(bpm: f64) -> Result<Self, Self::Error> {
        Self::new(bpm)
    }
}

impl From<Tempo> for f64 {
    fn from(tempo: Tempo) -> f64 {
        tempo.0
    }
}

/// A time signature such as 4/4, 3/4 or 6/8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    numerator: u8,
    denominator: u8,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        numerator: 4,
        denominator: 4,
    };

    /// Build a time signature.
    ///
    /// The numerator must be 1–32 and the denominator a power of two up to 16.
    pub fn new(numerator: u8, denominator: u8) -> Result<Self, TransportError> {
        let valid_denominator = matches!(denominator, 1 | 2 | 4 | 8 | 16);
        if numerator == 0 || numerator > 32 || !valid_denominator {
            return Err(TransportError::InvalidTimeSignature {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(self) -> u8 {
        self.numerator
    }

    pub fn denominator(self) -> u8 {
        self.denominator
    }

    /// Length of one bar in quarter-note ticks (6/8 → three beats).
    pub fn bar_length(self) -> Beat {
        let ticks_per_unit = TICKS_PER_BEAT * 4 / self.denominator as u64;
        Beat::from_ticks(self.numerator as u64 * ticks_per_unit)
    }

    /// Length of `bars` bars.
    pub fn bars(self, bars: u32) -> Beat {
        self.bar_length().times(bars as u64)
    }

    /// Pack into a single word for lock-free publication.
    pub(crate) fn pack(self) -> u32 {
        (self.numerator as u32) << 8 | self.denominator as u32
    }

    pub(crate) fn unpack(word: u32) -> Option<Self> {
        Self::new((word >> 8) as u8, (word & 0xff) as u8).ok()
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::COMMON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_clamps_into_range() {
        assert_eq!(Tempo::new(20.0).unwrap().bpm(), MIN_BPM);
        assert_eq!(Tempo::new(320.0).unwrap().bpm(), MAX_BPM);
        assert_eq!(Tempo::new(96.0).unwrap().bpm(), 96.0);
    }

    #[test]
    fn tempo_refuses_nonsense() {
        assert!(matches!(
            Tempo::new(0.0),
            Err(TransportError::InvalidTempo(_))
        ));
        assert!(Tempo::new(-10.0).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
        assert!(Tempo::new(f64::INFINITY).is_err());
    }

    #[test]
    fn seconds_per_beat() {
        assert!((Tempo::new(120.0).unwrap().seconds_per_beat() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn common_time_bar_is_four_beats() {
        assert_eq!(TimeSignature::COMMON.bar_length(), Beat::from_beats(4));
        assert_eq!(TimeSignature::COMMON.bars(2), Beat::from_beats(8));
    }

    #[test]
    fn compound_and_odd_meters() {
        assert_eq!(
            TimeSignature::new(6, 8).unwrap().bar_length(),
            Beat::from_beats(3)
        );
        assert_eq!(
            TimeSignature::new(3, 4).unwrap().bar_length(),
            Beat::from_beats(3)
        );
        assert_eq!(
            TimeSignature::new(5, 8).unwrap().bar_length(),
            Beat::from_beats_f64(2.5)
        );
    }

    #[test]
    fn invalid_signatures_rejected() {
        assert!(TimeSignature::new(0, 4).is_err());
        assert!(TimeSignature::new(4, 3).is_err());
        assert!(TimeSignature::new(4, 32).is_err());
        assert!(TimeSignature::new(33, 4).is_err());
    }

    #[test]
    fn pack_round_trip() {
        let sig = TimeSignature::new(7, 8).unwrap();
        assert_eq!(TimeSignature::unpack(sig.pack()), Some(sig));
        assert_eq!(TimeSignature::unpack(0), None);
    }
}
