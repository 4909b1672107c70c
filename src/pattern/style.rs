//! Styles: Named, immutable voice → grid tables, loaded from YAML.
//!
//! A style is plain data. The YAML form:
//!
//! ```yaml
//! name: rock
//! subdivision: sixteenth
//! tempo_range: [90, 150]
//! voices:
//!   kick:  { grid: "x-------x-x-----" }
//!   bass:
//!     grid: "x-------x-x-----"
//!     articulation: muted
//!     pitched: { class: bass, voicing: root_fifth }
//! articulations:
//!   ghost: { velocity_scale: 0.3 }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::grid::{Grid, Subdivision};
use crate::articulation::{Articulation, ArticulationOverride};
use crate::error::StyleError;
use crate::theory::{VoiceClass, Voicing};

/// How a pitched voice spends the chord on its hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// The k-th hit in a chord span plays the k-th voiced pitch.
    #[default]
    Line,
    /// Every hit plays all voiced pitches together.
    Chord,
}

/// Pitch settings for a voice that follows the progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PitchedPart {
    #[serde(default)]
    pub class: VoiceClass,
    #[serde(default)]
    pub voicing: Voicing,
    #[serde(default)]
    pub mode: PlayMode,
    /// Overrides the class's default octave.
    #[serde(default)]
    pub octave: Option<i8>,
}

impl PitchedPart {
    pub fn octave(&self) -> i8 {
        self.octave.unwrap_or_else(|| self.class.default_octave())
    }
}

/// Voice entry as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSpec {
    pub grid: String,
    #[serde(default)]
    pub articulation: Articulation,
    #[serde(default)]
    pub pitched: Option<PitchedPart>,
}

/// Style as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSpec {
    pub name: String,
    #[serde(default)]
    pub subdivision: Subdivision,
    #[serde(default = "default_tempo_range")]
    pub tempo_range: (f64, f64),
    #[serde(default)]
    pub swing: f64,
    pub voices: BTreeMap<String, VoiceSpec>,
    #[serde(default)]
    pub articulations: BTreeMap<Articulation, ArticulationOverride>,
}

fn default_tempo_range() -> (f64, f64) {
    (60.0, 180.0)
}

/// A validated voice.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDef {
    pub grid: Grid,
    /// Articulation given to plain hits.
    pub articulation: Articulation,
    pub pitched: Option<PitchedPart>,
}

/// A validated style.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub subdivision: Subdivision,
    pub tempo_range: (f64, f64),
    pub swing: f64,
    /// Sorted by voice name so compilation order is stable.
    pub voices: BTreeMap<String, VoiceDef>,
    pub articulations: BTreeMap<Articulation, ArticulationOverride>,
}

impl Style {
    /// An empty style to add voices to.
    pub fn new(name: &str, subdivision: Subdivision) -> Self {
        Self {
            name: name.to_string(),
            subdivision,
            tempo_range: default_tempo_range(),
            swing: 0.0,
            voices: BTreeMap::new(),
            articulations: BTreeMap::new(),
        }
    }

    /// Add an unpitched voice.
    pub fn with_voice(self, voice: &str, grid: &str) -> Result<Self, StyleError> {
        self.with_voice_def(voice, grid, Articulation::Normal, None)
    }

    /// Add a voice that follows the chord progression.
    pub fn with_pitched_voice(
        self,
        voice: &str,
        grid: &str,
        part: PitchedPart,
    ) -> Result<Self, StyleError> {
        self.with_voice_def(voice, grid, Articulation::Normal, Some(part))
    }

    /// Add a fully specified voice.
    pub fn with_voice_def(
        mut self,
        voice: &str,
        grid: &str,
        articulation: Articulation,
        pitched: Option<PitchedPart>,
    ) -> Result<Self, StyleError> {
        let grid = Grid::parse(voice, grid)?;
        self.voices.insert(
            voice.to_string(),
            VoiceDef {
                grid,
                articulation,
                pitched,
            },
        );
        Ok(self)
    }

    pub fn with_swing(mut self, swing: f64) -> Self {
        self.swing = swing;
        self
    }

    /// Validate a YAML spec.
    pub fn from_spec(spec: StyleSpec) -> Result<Self, StyleError> {
        if spec.voices.is_empty() {
            return Err(StyleError::NoVoices(spec.name));
        }
        let mut voices = BTreeMap::new();
        for (name, v) in spec.voices {
            let grid = Grid::parse(&name, &v.grid)?;
            voices.insert(
                name,
                VoiceDef {
                    grid,
                    articulation: v.articulation,
                    pitched: v.pitched,
                },
            );
        }
        Ok(Self {
            name: spec.name,
            subdivision: spec.subdivision,
            tempo_range: spec.tempo_range,
            swing: spec.swing,
            voices,
            articulations: spec.articulations,
        })
    }

    /// Parse a single style from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, StyleError> {
        let spec: StyleSpec = serde_yaml::from_str(yaml)?;
        Self::from_spec(spec)
    }

    /// Middle of the style's tempo range.
    pub fn default_tempo(&self) -> f64 {
        (self.tempo_range.0 + self.tempo_range.1) / 2.0
    }
}

/// A collection of named styles.
#[derive(Debug, Clone, Default)]
pub struct StyleBook {
    styles: BTreeMap<String, Style>,
}

impl StyleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The styles that ship with the crate.
    pub fn builtin() -> Result<Self, StyleError> {
        Self::from_yaml(BUILTIN_STYLES)
    }

    /// Parse a YAML sequence of styles.
    pub fn from_yaml(yaml: &str) -> Result<Self, StyleError> {
        let specs: Vec<StyleSpec> = serde_yaml::from_str(yaml)?;
        let mut book = Self::new();
        for spec in specs {
            book.insert(Style::from_spec(spec)?);
        }
        Ok(book)
    }

    /// Read a YAML sequence of styles from a file.
    pub fn load_file(path: &Path) -> Result<Self, StyleError> {
        let content = std::fs::read_to_string(path).map_err(|source| StyleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Add or replace a style.
    pub fn insert(&mut self, style: Style) {
        self.styles.insert(style.name.clone(), style);
    }

    /// Merge another book into this one; its styles win on name clashes.
    pub fn extend(&mut self, other: StyleBook) {
        self.styles.extend(other.styles);
    }

    pub fn get(&self, name: &str) -> Result<&Style, StyleError> {
        self.styles
            .get(name)
            .ok_or_else(|| StyleError::UnknownStyle(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

const BUILTIN_STYLES: &str = r#"
- name: rock
  subdivision: sixteenth
  tempo_range: [90, 150]
  voices:
    kick:  { grid: "x-------x-x-----" }
    snare: { grid: "----X-------X--g" }
    hat:   { grid: "x-x-x-x-x-x-x-x-" }
    bass:
      grid: "x-------x-x-----"
      articulation: muted
      pitched: { class: bass, voicing: root_fifth }

- name: funk
  subdivision: sixteenth
  tempo_range: [88, 118]
  voices:
    kick:  { grid: "x--x--x---x--x--" }
    snare: { grid: "----X--g-g--X--g" }
    hat:   { grid: "xgxgxgxgxgxgxgxg" }
    bass:
      grid: "x--x--x-x--x-x--"
      articulation: slap
      pitched: { class: bass, voicing: octaves }
    keys:
      grid: "--x---x---x--x--"
      articulation: staccato
      pitched: { class: comp, voicing: root, mode: chord }
  articulations:
    ghost: { velocity_scale: 0.3 }

- name: shuffle
  subdivision: eighth
  tempo_range: [70, 130]
  swing: 0.33
  voices:
    kick:  { grid: "x---x---" }
    snare: { grid: "--x---x-" }
    ride:  { grid: "x-xxx-xx" }
    bass:
      grid: "x-x-x-x-"
      pitched: { class: bass, voicing: walking }

- name: bossa
  subdivision: eighth
  tempo_range: [110, 150]
  voices:
    kick: { grid: "x--xx--x" }
    rim:  { grid: "x--x--x---x--x--" }
    hat:  { grid: "xxxxxxxx" }
    bass:
      grid: "x--xx--x"
      pitched: { class: bass, voicing: root_fifth }
    guitar:
      grid: "x-x--x-x-x-x--x-"
      articulation: staccato
      pitched: { class: comp, voicing: root, mode: chord }

- name: ballad
  subdivision: eighth
  tempo_range: [56, 84]
  voices:
    kick:  { grid: "x-------" }
    snare: { grid: "----x---" }
    hat:   { grid: "x-x-x-x-" }
    bass:
      grid: "x---x---"
      articulation: sustain
      pitched: { class: bass, voicing: pedal }
    pad:
      grid: "x-------"
      articulation: sustain
      pitched: { class: comp, voicing: root, mode: chord }
    lead:
      grid: "x-x-x-x-"
      pitched: { class: lead, voicing: arpeggio }

- name: jazz
  subdivision: quarter
  tempo_range: [100, 200]
  voices:
    ride: { grid: "xxxx" }
    hat:  { grid: "-x-x" }
    bass:
      grid: "xxxx"
      pitched: { class: bass, voicing: walking }
    comp:
      grid: "-g-x"
      articulation: staccato
      pitched: { class: comp, voicing: root, mode: chord }
"#;
