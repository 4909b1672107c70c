//! Pattern compiler: style + progression → time-ordered events.
//!
//! For every bar and every grid step, each sounding symbol becomes one event
//! (or one per chord tone in chord mode). Step indices are global across the
//! loop, so a grid shorter than a bar repeats and a longer grid runs on into
//! the next bar. Swing is counted from each bar's downbeat. Swing and humanization are applied here; articulation is
//! only a tag and is resolved at trigger time.

use tracing::{debug, warn};

use super::feel::{swing_offset, Humanizer};
use super::grid::{GridSymbol, Subdivision};
use super::progression::ChordProgression;
use super::style::{PlayMode, Style, VoiceDef};
use crate::articulation::Articulation;
use crate::event::{Beat, Event, TimeSignature};
use crate::theory::{Chord, ChordResolver};

/// Default humanization ceiling in beats.
pub const DEFAULT_HUMANIZE_CEILING: f64 = 0.02;

const HIT_VELOCITY: f32 = 0.8;
const ACCENT_VELOCITY: f32 = 1.0;
const DOWNBEAT_BOOST: f32 = 1.1;

/// Everything about a compile that is not the style or the progression.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    pub subdivision: Subdivision,
    pub bars: u32,
    pub meter: TimeSignature,
    /// Off-beat delay as a fraction of one step.
    pub swing: f64,
    /// Timing jitter in beats; 0 disables humanization entirely.
    pub humanize: f64,
    /// Relative velocity jitter used while humanization is on.
    pub humanize_velocity: f32,
    pub seed: u64,
}

impl CompileOptions {
    /// Options taking subdivision and swing from `style`: one bar of 4/4, no humanization.
    pub fn for_style(style: &Style) -> Self {
        Self {
            subdivision: style.subdivision,
            bars: 1,
            meter: TimeSignature::COMMON,
            swing: style.swing,
            humanize: 0.0,
            humanize_velocity: 0.1,
            seed: 0,
        }
    }

    pub fn with_bars(mut self, bars: u32) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_meter(mut self, meter: TimeSignature) -> Self {
        self.meter = meter;
        self
    }

    pub fn with_swing(mut self, swing: f64) -> Self {
        self.swing = swing;
        self
    }

    pub fn with_humanize(mut self, amount: f64, velocity: f32) -> Self {
        self.humanize = amount;
        self.humanize_velocity = velocity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// What the transport plays: a style over a progression for some bars.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub style: Style,
    pub progression: ChordProgression,
    pub bars: u32,
    pub swing: f64,
}

impl Arrangement {
    /// One bar per chord (at least one bar), with the style's own swing.
    pub fn new(style: Style, progression: ChordProgression) -> Self {
        let bars = progression.len().max(1) as u32;
        let swing = style.swing;
        Self {
            style,
            progression,
            bars,
            swing,
        }
    }

    pub fn with_bars(mut self, bars: u32) -> Self {
        self.bars = bars.max(1);
        self
    }

    pub fn with_swing(mut self, swing: f64) -> Self {
        self.swing = swing;
        self
    }

    /// Compile options for this arrangement under `meter`.
    pub fn options(&self, meter: TimeSignature) -> CompileOptions {
        CompileOptions::for_style(&self.style)
            .with_bars(self.bars)
            .with_meter(meter)
            .with_swing(self.swing)
    }
}

/// Output of a compile: one loop cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPattern {
    /// All events, sorted by start time (stable across voices).
    pub events: Vec<Event>,
    pub loop_length: Beat,
    /// Grid step length the scheduler advances by.
    pub step: Beat,
    /// Chord symbols that could not be parsed and were replaced by C major,
    /// one entry per affected chord span.
    pub substitutions: Vec<String>,
}

impl CompiledPattern {
    /// Events for one voice, in time order.
    pub fn voice<'a>(&'a self, voice: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.voice == voice)
    }
}

/// Compiles styles into events.
#[derive(Debug, Clone, Copy)]
pub struct PatternCompiler {
    resolver: ChordResolver,
    humanize_ceiling: f64,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_HUMANIZE_CEILING)
    }
}

impl PatternCompiler {
    /// A compiler whose humanization never exceeds `humanize_ceiling` beats.
    pub fn new(humanize_ceiling: f64) -> Self {
        Self {
            resolver: ChordResolver::new(),
            humanize_ceiling,
        }
    }

    /// Compile an arrangement with the given meter and humanization.
    pub fn compile_arrangement(
        &self,
        arrangement: &Arrangement,
        meter: TimeSignature,
        humanize: f64,
        humanize_velocity: f32,
        seed: u64,
    ) -> CompiledPattern {
        let options = arrangement
            .options(meter)
            .with_humanize(humanize, humanize_velocity)
            .with_seed(seed);
        self.compile(&arrangement.style, &arrangement.progression, &options)
    }

    /// Compile one loop cycle.
    pub fn compile(
        &self,
        style: &Style,
        progression: &ChordProgression,
        options: &CompileOptions,
    ) -> CompiledPattern {
        let unit = options.subdivision.step();
        let bar = options.meter.bar_length();
        let bars = options.bars.max(1);
        let loop_length = bar.times(bars as u64);
        let steps_per_bar = bar.ticks().div_ceil(unit.ticks());

        let mut substitutions = Vec::new();
        let chords = if style.voices.values().any(|v| v.pitched.is_some()) {
            self.resolve_spans(progression, options.meter, loop_length, &mut substitutions)
        } else {
            Vec::new()
        };

        let mut humanizer = Humanizer::new(
            options.seed,
            options.humanize,
            self.humanize_ceiling,
            options.humanize_velocity,
        );

        let layout = Layout {
            unit,
            bar,
            bars,
            steps_per_bar,
            loop_length,
            swing: options.swing,
            meter: options.meter,
        };

        let mut events = Vec::new();
        for (name, voice) in &style.voices {
            compile_voice(
                &self.resolver,
                name,
                voice,
                &layout,
                progression,
                &chords,
                &mut humanizer,
                &mut events,
            );
        }
        events.sort_by(|a, b| a.time.cmp(&b.time));

        debug!(
            style = %style.name,
            events = events.len(),
            bars,
            substitutions = substitutions.len(),
            "compiled pattern"
        );

        CompiledPattern {
            events,
            loop_length,
            step: unit,
            substitutions,
        }
    }

    /// Parse the chord of every span in the loop, substituting C major for
    /// symbols that cannot be read.
    fn resolve_spans(
        &self,
        progression: &ChordProgression,
        meter: TimeSignature,
        loop_length: Beat,
        substitutions: &mut Vec<String>,
    ) -> Vec<Chord> {
        if progression.is_empty() {
            return vec![ChordResolver::fallback_chord()];
        }
        let span = progression.chord_span(meter).ticks().max(1);
        let spans = loop_length.ticks().div_ceil(span).max(1);
        (0..spans)
            .map(|i| {
                let symbol = progression.symbol(i).unwrap_or_default();
                match Chord::parse(symbol) {
                    Ok(chord) => {
                        if !chord.recognized {
                            debug!(symbol, "unknown chord quality, using major triad");
                        }
                        chord
                    }
                    Err(err) => {
                        warn!(%err, span = i, "substituting C major");
                        substitutions.push(symbol.to_string());
                        ChordResolver::fallback_chord()
                    }
                }
            })
            .collect()
    }
}

/// Loop geometry shared by every voice of one compile.
struct Layout {
    unit: Beat,
    bar: Beat,
    bars: u32,
    steps_per_bar: u64,
    loop_length: Beat,
    swing: f64,
    meter: TimeSignature,
}

#[allow(clippy::too_many_arguments)]
fn compile_voice(
    resolver: &ChordResolver,
    name: &str,
    voice: &VoiceDef,
    layout: &Layout,
    progression: &ChordProgression,
    chords: &[Chord],
    humanizer: &mut Humanizer,
    out: &mut Vec<Event>,
) {
    let mut previous = Beat::ZERO;
    // (span index, hits so far in that span) for line-mode pitch selection
    let mut line_position: Option<(u64, usize)> = None;

    for bar in 0..layout.bars as u64 {
        let bar_start = layout.bar.times(bar);
        for j in 0..layout.steps_per_bar {
            let offset = layout.unit.times(j);
            if offset >= layout.bar {
                break;
            }
            let global = bar * layout.steps_per_bar + j;
            let symbol = voice.grid.at(global);
            let (base_velocity, articulation) = match symbol {
                GridSymbol::Rest => continue,
                GridSymbol::Hit => (HIT_VELOCITY, voice.articulation),
                GridSymbol::Accent => (ACCENT_VELOCITY, Articulation::Accent),
                GridSymbol::Ghost => (HIT_VELOCITY, Articulation::Ghost),
            };
            let velocity = if j == 0 {
                (base_velocity * DOWNBEAT_BOOST).min(1.0)
            } else {
                base_velocity
            };

            let straight = bar_start + offset;
            let swung = straight + swing_offset(offset, layout.unit, layout.swing);
            let swung = swung.min(Beat::from_ticks(layout.loop_length.ticks().saturating_sub(1)));
            let time = humanizer.time(swung, previous, layout.loop_length);
            previous = time;

            let duration = layout.unit.times(voice.grid.steps_to_next_sound(global));

            let Some(part) = voice.pitched else {
                let event = Event::hit(time, duration, name, humanizer.velocity(velocity))
                    .with_articulation(articulation);
                out.push(event);
                continue;
            };

            if chords.is_empty() {
                continue;
            }
            let span = progression.span_index(straight, layout.meter) % chords.len() as u64;
            let chord = &chords[span as usize];
            let next = &chords[((span + 1) % chords.len() as u64) as usize];
            let pitches = resolver.voice(chord, part.voicing, part.octave(), Some(next));
            if pitches.is_empty() {
                continue;
            }

            match part.mode {
                PlayMode::Line => {
                    let k = match line_position {
                        Some((s, k)) if s == span => k,
                        _ => 0,
                    };
                    line_position = Some((span, k + 1));
                    let note = pitches[k % pitches.len()];
                    out.push(
                        Event::note(time, duration, name, note, humanizer.velocity(velocity))
                            .with_articulation(articulation),
                    );
                }
                PlayMode::Chord => {
                    for note in pitches {
                        out.push(
                            Event::note(time, duration, name, note, humanizer.velocity(velocity))
                                .with_articulation(articulation),
                        );
                    }
                }
            }
        }
    }
}
