//! Sorted event storage with cursor-based consumption.
//!
//! Events are stored sorted by time. A cursor tracks the current read position
//! so that `drain_range` only scans unconsumed events. Looping rewinds the
//! cursor instead of copying events, so one compiled cycle replays for free.

use super::beat::Beat;
use super::types::Event;

/// A sorted timeline of events with a read cursor.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    events: Vec<Event>,
    cursor: usize,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timeline from compiled events.
    ///
    /// Uses a stable sort so simultaneous events keep their compile order.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        events.sort_by(|a, b| a.time.cmp(&b.time));
        Self { events, cursor: 0 }
    }

    /// Drain all events in `[from, to)` and advance the cursor past them.
    ///
    /// Events before `from` that were never read are skipped. Returns the
    /// drained events in time order.
    pub fn drain_range(&mut self, from: Beat, to: Beat) -> Vec<Event> {
        let mut result = Vec::new();
        while self.cursor < self.events.len() {
            let event_time = self.events[self.cursor].time;
            if event_time >= to {
                break;
            }
            if event_time >= from {
                result.push(self.events[self.cursor].clone());
            }
            self.cursor += 1;
        }
        result
    }

    /// Move the cursor to the first event at or after `position`.
    pub fn seek(&mut self, position: Beat) {
        self.cursor = self.events.partition_point(|e| e.time < position);
    }

    /// Reset the cursor to the beginning.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// All events, in time order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Total number of events in the timeline.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of unconsumed events remaining after the cursor.
    pub fn remaining(&self) -> usize {
        self.events.len().saturating_sub(self.cursor)
    }
}
