//! Live state of one playing transport.

use crate::event::{Beat, Timeline};
use crate::pattern::CompiledPattern;

use super::trigger::TriggerHandle;

/// Created by `start()`, destroyed by `stop()`.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    id: u64,
    /// Musical position of the next step to schedule.
    pub(crate) cursor: Beat,
    /// Clock time at which `cursor` sounds.
    pub(crate) next_event_time: f64,
    /// Completed loop cycles.
    pub(crate) cycle: u64,
    pub(crate) timeline: Timeline,
    pub(crate) loop_length: Beat,
    pub(crate) step: Beat,
    /// Outstanding handles with the clock time their sound ends.
    pub(crate) pending: Vec<(TriggerHandle, f64)>,
}

impl PlaybackSession {
    pub(crate) fn new(id: u64, pattern: CompiledPattern, now: f64) -> Self {
        Self {
            id,
            cursor: Beat::ZERO,
            next_event_time: now,
            cycle: 0,
            timeline: Timeline::from_events(pattern.events),
            loop_length: pattern.loop_length,
            step: pattern.step,
            pending: Vec::new(),
        }
    }

    /// Swap in a freshly compiled pattern and move the read position to `cursor`.
    pub(crate) fn load(&mut self, pattern: CompiledPattern, cursor: Beat) {
        self.timeline = Timeline::from_events(pattern.events);
        self.loop_length = pattern.loop_length;
        self.step = pattern.step;
        self.cursor = cursor;
        self.timeline.seek(cursor);
    }

    /// Forget handles whose sound has finished by `now`.
    pub(crate) fn retire(&mut self, now: f64) {
        self.pending.retain(|&(_, end)| end > now);
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cursor(&self) -> Beat {
        self.cursor
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn loop_length(&self) -> Beat {
        self.loop_length
    }

    pub fn step(&self) -> Beat {
        self.step
    }

    pub fn pending_handles(&self) -> usize {
        self.pending.len()
    }

    /// The loop currently being played.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn pattern() -> CompiledPattern {
        CompiledPattern {
            events: vec![
                Event::hit(Beat::from_beats(2), Beat::from_beats(1), "snare", 0.8),
                Event::hit(Beat::ZERO, Beat::from_beats(1), "kick", 0.8),
            ],
            loop_length: Beat::from_beats(4),
            step: Beat::from_ticks(240),
            substitutions: Vec::new(),
        }
    }

    #[test]
    fn new_session_starts_at_zero() {
        let s = PlaybackSession::new(3, pattern(), 10.0);
        assert_eq!(s.id(), 3);
        assert_eq!(s.cursor(), Beat::ZERO);
        assert_eq!(s.next_event_time(), 10.0);
        assert_eq!(s.timeline().events()[0].voice, "kick");
        assert_eq!(s.pending_handles(), 0);
    }

    #[test]
    fn retire_drops_finished_sounds() {
        let mut s = PlaybackSession::new(1, pattern(), 0.0);
        s.pending.push((TriggerHandle(1), 0.5));
        s.pending.push((TriggerHandle(2), 1.5));
        s.retire(1.0);
        assert_eq!(s.pending, vec![(TriggerHandle(2), 1.5)]);
    }

    #[test]
    fn load_seeks_to_cursor() {
        let mut s = PlaybackSession::new(1, pattern(), 0.0);
        s.load(pattern(), Beat::from_beats(1));
        assert_eq!(s.cursor(), Beat::from_beats(1));
        assert_eq!(s.timeline.remaining(), 1);
    }
}
