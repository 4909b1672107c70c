//! Chord progressions: Cyclic sequences of chord symbols.

use crate::event::{Beat, TimeSignature};

/// An ordered, cyclic list of chord symbols, one per bar unless a chord
/// span is given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChordProgression {
    symbols: Vec<String>,
    beats_per_chord: Option<Beat>,
}

impl ChordProgression {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            beats_per_chord: None,
        }
    }

    /// Parse whitespace-separated symbols; `|` bar lines are ignored.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split_whitespace().filter(|s| *s != "|"))
    }

    /// Change chords every `span` instead of every bar.
    pub fn with_chord_span(mut self, span: Beat) -> Self {
        self.beats_per_chord = (span > Beat::ZERO).then_some(span);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// How long each chord lasts under `meter`.
    pub fn chord_span(&self, meter: TimeSignature) -> Beat {
        self.beats_per_chord.unwrap_or_else(|| meter.bar_length())
    }

    /// Index of the chord span containing `time`, not yet wrapped.
    pub fn span_index(&self, time: Beat, meter: TimeSignature) -> u64 {
        time.ticks() / self.chord_span(meter).ticks().max(1)
    }

    /// Symbol for a span index, wrapping modulo the progression length.
    pub fn symbol(&self, span_index: u64) -> Option<&str> {
        if self.symbols.is_empty() {
            return None;
        }
        let i = (span_index % self.symbols.len() as u64) as usize;
        Some(self.symbols[i].as_str())
    }
}
