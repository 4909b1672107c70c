//! Feel: Swing and humanization.
//!
//! Swing is a fixed delay of off-beat steps. Humanization draws bounded timing and
//! velocity offsets from a seeded `ChaCha8Rng`, so a given seed always yields
//! the same performance.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::event::{Beat, TICKS_PER_BEAT};

/// Largest swing ratio; at 1.0 an off-beat would land on the next step.
pub const MAX_SWING: f64 = 0.9;

/// Delay applied by swing to a step starting `offset` into its bar.
///
/// Steps are paired from the top of each bar; the second step of a pair moves
/// late by `swing * unit`. Subdivisions whose pairs do not divide a beat
/// evenly (quarters, eighth triplets) never swing.
pub fn swing_offset(offset: Beat, unit: Beat, swing: f64) -> Beat {
    let pair = unit.ticks() * 2;
    if pair == 0 || TICKS_PER_BEAT % pair != 0 || swing.is_nan() || swing <= 0.0 {
        return Beat::ZERO;
    }
    if offset.ticks() % pair < unit.ticks() {
        return Beat::ZERO;
    }
    let swing = swing.min(MAX_SWING);
    Beat::from_ticks((unit.ticks() as f64 * swing).round() as u64)
}

/// Seeded timing and velocity jitter.
#[derive(Debug, Clone)]
pub struct Humanizer {
    rng: ChaCha8Rng,
    max_ticks: u64,
    velocity_spread: f32,
}

impl Humanizer {
    /// `amount` is in beats and is capped by `ceiling`; `velocity_spread` is
    /// the largest relative velocity change (0.1 = ±10%).
    pub fn new(seed: u64, amount: f64, ceiling: f64, velocity_spread: f32) -> Self {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        let ceiling = if ceiling.is_finite() { ceiling.max(0.0) } else { 0.0 };
        let max_ticks = (amount.min(ceiling) * TICKS_PER_BEAT as f64).floor() as u64;
        let velocity_spread = if max_ticks == 0 {
            0.0
        } else {
            velocity_spread.clamp(0.0, 1.0)
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_ticks,
            velocity_spread,
        }
    }

    /// Jitter `time`, keeping it at or after `floor` (the voice's previous
    /// start) and before `loop_end`.
    pub fn time(&mut self, time: Beat, floor: Beat, loop_end: Beat) -> Beat {
        if self.max_ticks == 0 {
            return time;
        }
        let max = self.max_ticks as i64;
        let shifted = time.offset_by(self.rng.gen_range(-max..=max));
        let ceiling = Beat::from_ticks(loop_end.ticks().saturating_sub(1)).max(floor);
        shifted.clamp(floor, ceiling)
    }

    /// Jitter a velocity, staying inside `[0, 1]`.
    pub fn velocity(&mut self, velocity: f32) -> f32 {
        if self.velocity_spread <= 0.0 {
            return velocity.clamp(0.0, 1.0);
        }
        let spread = self.velocity_spread;
        let factor = 1.0 + self.rng.gen_range(-spread..=spread);
        (velocity * factor).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sixteenth() -> Beat {
        Beat::from_ticks(240)
    }

    fn step(n: u64) -> Beat {
        sixteenth().times(n)
    }

    #[test]
    fn swing_delays_off_beat_steps_only() {
        assert_eq!(swing_offset(step(0), sixteenth(), 0.5), Beat::ZERO);
        assert_eq!(swing_offset(step(1), sixteenth(), 0.5).ticks(), 120);
        assert_eq!(swing_offset(step(2), sixteenth(), 0.5), Beat::ZERO);
        assert_eq!(swing_offset(step(7), sixteenth(), 0.25).ticks(), 60);
    }

    #[test]
    fn zero_swing_is_noop() {
        for n in 0..8 {
            assert_eq!(swing_offset(step(n), sixteenth(), 0.0), Beat::ZERO);
        }
        assert_eq!(swing_offset(step(1), sixteenth(), -0.3), Beat::ZERO);
        assert_eq!(swing_offset(step(1), sixteenth(), f64::NAN), Beat::ZERO);
    }

    #[test]
    fn swing_is_capped_below_a_full_step() {
        assert_eq!(swing_offset(step(1), sixteenth(), 5.0).ticks(), 216);
    }

    #[test]
    fn quarters_and_eighth_triplets_do_not_swing() {
        let quarter = Beat::from_beats(1);
        for n in 0..4 {
            assert_eq!(swing_offset(quarter.times(n), quarter, 0.5), Beat::ZERO);
        }
        let triplet = Beat::from_ticks(TICKS_PER_BEAT / 3);
        for n in 0..6 {
            assert_eq!(swing_offset(triplet.times(n), triplet, 0.5), Beat::ZERO);
        }
    }

    #[test]
    fn eighth_swing_counts_from_the_bar() {
        let eighth = Beat::from_ticks(TICKS_PER_BEAT / 2);
        assert_eq!(swing_offset(eighth.times(1), eighth, 0.5).ticks(), 240);
        assert_eq!(swing_offset(eighth.times(4), eighth, 0.5), Beat::ZERO);
    }

    #[test]
    fn zero_amount_humanizer_is_identity() {
        let mut h = Humanizer::new(0, 0.0, 0.02, 0.1);
        let t = Beat::from_beats(3);
        assert_eq!(h.time(t, Beat::ZERO, Beat::from_beats(4)), t);
        assert_eq!(h.velocity(0.8), 0.8);
        assert_eq!(h.velocity(1.4), 1.0);
    }

    #[test]
    fn amount_capped_by_ceiling() {
        let base = Beat::from_beats(2);
        let end = Beat::from_beats(4);
        for (amount, limit) in [(0.5, 19), (0.01, 9)] {
            let mut h = Humanizer::new(1, amount, 0.02, 0.1);
            for _ in 0..200 {
                let delta = h.time(base, Beat::ZERO, end).ticks() as i64 - base.ticks() as i64;
                assert!(delta.abs() <= limit, "{amount}: {delta}");
            }
        }
    }

    #[test]
    fn timing_stays_in_bounds() {
        let mut h = Humanizer::new(7, 0.02, 0.02, 0.1);
        let loop_end = Beat::from_beats(4);
        for i in 1..15u64 {
            let base = Beat::from_ticks(i * 240);
            let out = h.time(base, Beat::ZERO, loop_end);
            let delta = out.ticks() as i64 - base.ticks() as i64;
            assert!(delta.abs() <= 19, "delta {delta}");
        }
    }

    #[test]
    fn timing_respects_floor_and_loop_end() {
        let mut h = Humanizer::new(3, 0.02, 0.02, 0.0);
        let loop_end = Beat::from_beats(4);
        for _ in 0..100 {
            let out = h.time(Beat::ZERO, Beat::ZERO, loop_end);
            assert!(out >= Beat::ZERO);
            let last = h.time(Beat::from_ticks(3839), Beat::ZERO, loop_end);
            assert!(last < loop_end);
            let floored = h.time(Beat::from_ticks(1000), Beat::from_ticks(1005), loop_end);
            assert!(floored >= Beat::from_ticks(1005));
        }
    }

    #[test]
    fn velocity_stays_in_unit_range() {
        let mut h = Humanizer::new(11, 0.02, 0.02, 0.5);
        for _ in 0..200 {
            let v = h.velocity(0.95);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn same_seed_same_jitter() {
        let mut a = Humanizer::new(99, 0.02, 0.02, 0.1);
        let mut b = Humanizer::new(99, 0.02, 0.02, 0.1);
        let end = Beat::from_beats(4);
        for i in 1..10u64 {
            let t = Beat::from_ticks(i * 240);
            assert_eq!(a.time(t, Beat::ZERO, end), b.time(t, Beat::ZERO, end));
            assert_eq!(a.velocity(0.7), b.velocity(0.7));
        }
    }
}
