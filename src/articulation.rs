//! Articulations: Playback modifiers applied at trigger time.
//!
//! Compiled events only carry an [`Articulation`] tag. The [`ArticulationTable`]
//! turns that tag into concrete duration/velocity/pitch/voice changes when the
//! event is handed to the sound collaborator, so a different table (a different
//! sound palette) can re-render the same compiled pattern without recompiling.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::event::{Event, PitchSpec};

/// Playback modifier tag carried by every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Articulation {
    #[default]
    Normal,
    Accent,
    Ghost,
    Staccato,
    Slap,
    Pop,
    Slide,
    Muted,
    Sustain,
}

impl Articulation {
    pub const ALL: [Articulation; 9] = [
        Articulation::Normal,
        Articulation::Accent,
        Articulation::Ghost,
        Articulation::Staccato,
        Articulation::Slap,
        Articulation::Pop,
        Articulation::Slide,
        Articulation::Muted,
        Articulation::Sustain,
    ];

    /// Built-in modifiers for this tag.
    pub fn default_modifiers(self) -> ArticulationModifiers {
        let (duration_scale, velocity_scale, pitch_shift) = match self {
            Articulation::Normal => (1.0, 1.0, 0),
            Articulation::Accent => (1.0, 1.2, 0),
            Articulation::Ghost => (0.5, 0.35, 0),
            Articulation::Staccato => (0.4, 0.9, 0),
            Articulation::Slap => (0.5, 1.1, 0),
            Articulation::Pop => (0.4, 1.15, 12),
            Articulation::Slide => (1.5, 0.9, 0),
            Articulation::Muted => (0.25, 0.7, 0),
            Articulation::Sustain => (2.0, 1.0, 0),
        };
        ArticulationModifiers {
            duration_scale,
            velocity_scale,
            pitch_shift,
            alternate_voice: None,
        }
    }
}

/// Concrete modifiers for one articulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticulationModifiers {
    pub duration_scale: f64,
    pub velocity_scale: f32,
    pub pitch_shift: i8,
    /// Voice that plays the event instead of the compiled one.
    pub alternate_voice: Option<String>,
}

/// Partial modifiers as written in a style table; missing fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticulationOverride {
    pub duration_scale: Option<f64>,
    pub velocity_scale: Option<f32>,
    pub pitch_shift: Option<i8>,
    pub alternate_voice: Option<String>,
}

/// An event after articulation, ready to be timed and triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct Articulated {
    pub voice: String,
    pub pitch: PitchSpec,
    pub duration_beats: f64,
    pub velocity: f32,
}

/// Lookup from articulation tag to modifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticulationTable {
    entries: HashMap<Articulation, ArticulationModifiers>,
}

impl ArticulationTable {
    /// The built-in table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Modifiers for a tag.
    pub fn modifiers(&self, articulation: Articulation) -> ArticulationModifiers {
        self.entries
            .get(&articulation)
            .cloned()
            .unwrap_or_else(|| articulation.default_modifiers())
    }

    /// Replace the modifiers for one tag.
    pub fn set(&mut self, articulation: Articulation, modifiers: ArticulationModifiers) {
        self.entries.insert(articulation, modifiers);
    }

    /// A copy of this table with style overrides layered on top.
    pub fn with_overrides(&self, overrides: &BTreeMap<Articulation, ArticulationOverride>) -> Self {
        let mut table = self.clone();
        for (&articulation, over) in overrides {
            let mut m = table.modifiers(articulation);
            if let Some(d) = over.duration_scale {
                m.duration_scale = d.max(0.0);
            }
            if let Some(v) = over.velocity_scale {
                m.velocity_scale = v.max(0.0);
            }
            if let Some(p) = over.pitch_shift {
                m.pitch_shift = p;
            }
            if over.alternate_voice.is_some() {
                m.alternate_voice = over.alternate_voice.clone();
            }
            table.set(articulation, m);
        }
        table
    }

    /// Apply the event's articulation.
    pub fn apply(&self, event: &Event) -> Articulated {
        let m = self.modifiers(event.articulation);
        Articulated {
            voice: m.alternate_voice.unwrap_or_else(|| event.voice.clone()),
            pitch: event.pitch.shifted(m.pitch_shift),
            duration_beats: event.duration.as_beats_f64() * m.duration_scale,
            velocity: (event.velocity * m.velocity_scale).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Beat;

    #[test]
    fn every_tag_has_defaults() {
        let table = ArticulationTable::new();
        for tag in Articulation::ALL {
            let m = table.modifiers(tag);
            assert!(m.duration_scale > 0.0, "{tag:?}");
            assert!(m.velocity_scale > 0.0, "{tag:?}");
        }
    }

    #[test]
    fn normal_is_identity() {
        let table = ArticulationTable::new();
        let e = Event::note(Beat::ZERO, Beat::from_beats(1), "bass", 40, 0.6);
        let out = table.apply(&e);
        assert_eq!(out.voice, "bass");
        assert_eq!(out.pitch, PitchSpec::Note(40));
        assert!((out.duration_beats - 1.0).abs() < 1e-12);
        assert!((out.velocity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn ghost_softens_and_shortens() {
        let table = ArticulationTable::new();
        let e = Event::hit(Beat::ZERO, Beat::from_beats(1), "snare", 0.8)
            .with_articulation(Articulation::Ghost);
        let out = table.apply(&e);
        assert!((out.duration_beats - 0.5).abs() < 1e-12);
        assert!((out.velocity - 0.28).abs() < 1e-6);
    }

    #[test]
    fn pop_shifts_octave_and_velocity_clamps() {
        let table = ArticulationTable::new();
        let e = Event::note(Beat::ZERO, Beat::from_beats(1), "bass", 40, 0.95)
            .with_articulation(Articulation::Pop);
        let out = table.apply(&e);
        assert_eq!(out.pitch, PitchSpec::Note(52));
        assert!(out.velocity <= 1.0);
    }

    #[test]
    fn overrides_merge_field_by_field() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Articulation::Ghost,
            ArticulationOverride {
                velocity_scale: Some(0.2),
                alternate_voice: Some("rim".into()),
                ..Default::default()
            },
        );
        let table = ArticulationTable::new().with_overrides(&overrides);
        let m = table.modifiers(Articulation::Ghost);
        assert!((m.velocity_scale - 0.2).abs() < 1e-6);
        assert!((m.duration_scale - 0.5).abs() < 1e-12);
        assert_eq!(m.alternate_voice.as_deref(), Some("rim"));

        let e = Event::hit(Beat::ZERO, Beat::from_beats(1), "snare", 1.0)
            .with_articulation(Articulation::Ghost);
        assert_eq!(table.apply(&e).voice, "rim");
    }

    #[test]
    fn same_event_two_palettes() {
        let e = Event::note(Beat::ZERO, Beat::from_beats(1), "bass", 40, 0.5)
            .with_articulation(Articulation::Slap);
        let plain = ArticulationTable::new();
        let mut bright = ArticulationTable::new();
        bright.set(
            Articulation::Slap,
            ArticulationModifiers {
                duration_scale: 1.0,
                velocity_scale: 1.0,
                pitch_shift: 12,
                alternate_voice: Some("slap_bass".into()),
            },
        );
        assert_eq!(plain.apply(&e).pitch, PitchSpec::Note(40));
        let out = bright.apply(&e);
        assert_eq!(out.pitch, PitchSpec::Note(52));
        assert_eq!(out.voice, "slap_bass");
    }

    #[test]
    fn yaml_keys_are_snake_case() {
        let yaml = "ghost:\n  velocity_scale: 0.3\nsustain:\n  duration_scale: 3.0\n";
        let parsed: BTreeMap<Articulation, ArticulationOverride> =
            serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[&Articulation::Sustain].duration_scale, Some(3.0));
    }
}
