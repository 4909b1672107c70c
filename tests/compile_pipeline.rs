//! Compile pipeline integration tests: Style + progression → events.
//!
//! Exercises the pattern compiler through the public API only: grid timing,
//! determinism, humanization bounds and per-voice ordering across every
//! built-in style.

use assert_approx_eq::assert_approx_eq;

use backbeat::event::{Beat, Event, PitchSpec, Tempo, TimeSignature};
use backbeat::pattern::{
    Arrangement, ChordProgression, CompileOptions, CompiledPattern, PatternCompiler, PitchedPart,
    PlayMode, Style, StyleBook, Subdivision,
};
use backbeat::theory::{note_name, ChordResolver, VoiceClass, Voicing};

fn seconds(events: &[&Event], bpm: f64) -> Vec<f64> {
    events.iter().map(|e| e.time.to_seconds(bpm)).collect()
}

fn beats(events: &[&Event]) -> Vec<f64> {
    events.iter().map(|e| e.time.as_beats_f64()).collect()
}

fn compile_rock(kick: &str, snare: &str) -> CompiledPattern {
    let style = Style::new("rock", Subdivision::Sixteenth)
        .with_voice("kick", kick)
        .unwrap()
        .with_voice("snare", snare)
        .unwrap();
    let options = CompileOptions::for_style(&style).with_bars(1);
    PatternCompiler::default().compile(&style, &ChordProgression::parse("C"), &options)
}

// =============================================================================
// Grid timing at 120 BPM
// =============================================================================

#[test]
fn rock_quarter_note_kick_and_backbeat() {
    let pattern = compile_rock("x---x---x---x---", "----x-------x---");
    let kick: Vec<_> = pattern.voice("kick").collect();
    let snare: Vec<_> = pattern.voice("snare").collect();

    assert_eq!(beats(&kick), [0.0, 1.0, 2.0, 3.0]);
    assert_eq!(beats(&snare), [1.0, 3.0]);

    let bpm = Tempo::default().bpm();
    for (got, want) in seconds(&kick, bpm).iter().zip([0.0, 0.5, 1.0, 1.5]) {
        assert_approx_eq!(*got, want);
    }
    for (got, want) in seconds(&snare, bpm).iter().zip([0.5, 1.5]) {
        assert_approx_eq!(*got, want);
    }
}

#[test]
fn rock_half_time_grids() {
    let pattern = compile_rock("x-------x-------", "----x-----------");
    let kick: Vec<_> = pattern.voice("kick").collect();
    let snare: Vec<_> = pattern.voice("snare").collect();

    assert_eq!(beats(&kick), [0.0, 2.0]);
    assert_eq!(beats(&snare), [1.0]);
    assert_eq!(seconds(&kick, 120.0), [0.0, 1.0]);
    assert_eq!(seconds(&snare, 120.0), [0.5]);
}

#[test]
fn loop_length_follows_meter_and_bars() {
    let style = Style::new("t", Subdivision::Eighth)
        .with_voice("hat", "x")
        .unwrap();
    let options = CompileOptions::for_style(&style)
        .with_bars(3)
        .with_meter(TimeSignature::new(6, 8).unwrap());
    let pattern = PatternCompiler::default().compile(&style, &ChordProgression::default(), &options);
    assert_eq!(pattern.loop_length, Beat::from_beats(9));
    assert_eq!(pattern.events.len(), 18);
}

// =============================================================================
// Swing
// =============================================================================

fn swung_beats(style: &Style, options: &CompileOptions) -> Vec<f64> {
    let pattern = PatternCompiler::default().compile(style, &ChordProgression::default(), options);
    pattern.events.iter().map(|e| e.time.as_beats_f64()).collect()
}

#[test]
fn swing_leaves_quarter_notes_on_the_beat() {
    let style = Style::new("t", Subdivision::Quarter)
        .with_voice("kick", "xxxx")
        .unwrap();
    let options = CompileOptions::for_style(&style).with_swing(0.5);
    assert_eq!(swung_beats(&style, &options), [0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn swing_leaves_eighth_triplets_alone() {
    let style = Style::new("t", Subdivision::EighthTriplet)
        .with_voice("ride", "xxx")
        .unwrap();
    let options = CompileOptions::for_style(&style).with_swing(0.5);
    let times = swung_beats(&style, &options);
    assert_eq!(times.len(), 12);
    for (i, t) in times.iter().enumerate() {
        assert_approx_eq!(*t, i as f64 / 3.0, 1e-3);
    }
    assert_eq!(times[3], 1.0);
}

#[test]
fn swing_restarts_each_bar_in_odd_meters() {
    let style = Style::new("t", Subdivision::Eighth)
        .with_voice("hat", "xxxxx")
        .unwrap();
    let options = CompileOptions::for_style(&style)
        .with_meter(TimeSignature::new(5, 8).unwrap())
        .with_bars(2)
        .with_swing(0.5);
    assert_eq!(
        swung_beats(&style, &options),
        [0.0, 0.75, 1.0, 1.75, 2.0, 2.5, 3.25, 3.5, 4.25, 4.5]
    );
}

// =============================================================================
// Determinism and humanization
// =============================================================================

#[test]
fn compile_without_feel_is_deterministic() {
    let book = StyleBook::builtin().unwrap();
    let compiler = PatternCompiler::default();
    for name in book.names() {
        let style = book.get(name).unwrap();
        let progression = ChordProgression::parse("Dm7 G7 Cmaj7 A7");
        let options = CompileOptions::for_style(style).with_bars(4).with_swing(0.0);
        let a = compiler.compile(style, &progression, &options);
        let b = compiler.compile(style, &progression, &options);
        assert_eq!(a, b, "{name}");
    }
}

#[test]
fn humanization_stays_within_amount() {
    let book = StyleBook::builtin().unwrap();
    let style = book.get("funk").unwrap();
    let progression = ChordProgression::parse("E7 A7");
    let compiler = PatternCompiler::default();

    let straight = compiler.compile(
        style,
        &progression,
        &CompileOptions::for_style(style).with_bars(2),
    );
    let amount = 0.015;
    for seed in 0..20 {
        let options = CompileOptions::for_style(style)
            .with_bars(2)
            .with_humanize(amount, 0.2)
            .with_seed(seed);
        let humanized = compiler.compile(style, &progression, &options);
        assert_eq!(humanized.events.len(), straight.events.len());

        for voice in style.voices.keys() {
            let base: Vec<_> = straight.voice(voice).collect();
            let moved: Vec<_> = humanized.voice(voice).collect();
            for (b, m) in base.iter().zip(&moved) {
                let delta = (m.time.as_beats_f64() - b.time.as_beats_f64()).abs();
                assert!(delta <= amount + 1e-9, "{voice}: moved {delta} beats");
                assert!((0.0..=1.0).contains(&m.velocity));
            }
        }
    }
}

#[test]
fn humanization_respects_ceiling() {
    let style = Style::new("t", Subdivision::Quarter)
        .with_voice("kick", "xxxx")
        .unwrap();
    let compiler = PatternCompiler::new(0.01);
    let options = CompileOptions::for_style(&style)
        .with_humanize(0.5, 0.0)
        .with_seed(3);
    let pattern = compiler.compile(&style, &ChordProgression::default(), &options);
    for (i, e) in pattern.events.iter().enumerate() {
        let delta = (e.time.as_beats_f64() - i as f64).abs();
        assert!(delta <= 0.01 + 1e-9);
    }
}

#[test]
fn every_builtin_style_is_monotonic_per_voice() {
    let book = StyleBook::builtin().unwrap();
    let compiler = PatternCompiler::default();
    for name in book.names() {
        let style = book.get(name).unwrap();
        let options = CompileOptions::for_style(style)
            .with_bars(4)
            .with_humanize(0.02, 0.1)
            .with_seed(42);
        let pattern = compiler.compile(style, &ChordProgression::parse("C F G C"), &options);
        assert!(!pattern.events.is_empty(), "{name}");
        for voice in style.voices.keys() {
            let times: Vec<Beat> = pattern.voice(voice).map(|e| e.time).collect();
            assert!(
                times.windows(2).all(|w| w[0] <= w[1]),
                "{name}/{voice} not monotonic"
            );
            assert!(times.iter().all(|&t| t < pattern.loop_length));
        }
    }
}

// =============================================================================
// Harmony
// =============================================================================

#[test]
fn chord_resolution_examples() {
    let names = |pitches: Vec<u8>| -> Vec<String> { pitches.into_iter().map(note_name).collect() };
    assert_eq!(
        names(ChordResolver.resolve("Am7", Voicing::Root, 2).unwrap()),
        ["A2", "C3", "E3", "G3"]
    );
    let slash = ChordResolver.resolve("C/E", Voicing::Root, 3).unwrap();
    assert_eq!(names(slash.clone()), ["E2", "C3", "G3"]);
    assert_eq!(slash.iter().min(), slash.first());
}

#[test]
fn walking_bass_leads_into_next_chord() {
    let part = PitchedPart {
        class: VoiceClass::Bass,
        voicing: Voicing::Walking,
        mode: PlayMode::Line,
        octave: None,
    };
    let style = Style::new("walk", Subdivision::Quarter)
        .with_pitched_voice("bass", "xxxx", part)
        .unwrap();
    let arrangement = Arrangement::new(style, ChordProgression::parse("C F"));
    let pattern = PatternCompiler::default().compile_arrangement(
        &arrangement,
        TimeSignature::COMMON,
        0.0,
        0.0,
        0,
    );
    let notes: Vec<_> = pattern.events.iter().map(|e| e.pitch).collect();
    // C2 E2 G2 then F#2 into F; F2 A2 C3 then C#2 back to C
    assert_eq!(
        notes,
        [36, 40, 43, 42, 41, 45, 48, 37].map(PitchSpec::Note)
    );
}

#[test]
fn bad_chords_do_not_stop_compilation() {
    let book = StyleBook::builtin().unwrap();
    let style = book.get("rock").unwrap();
    let progression = ChordProgression::parse("C Xyz7 ??? G");
    let options = CompileOptions::for_style(style).with_bars(4);
    let pattern = PatternCompiler::default().compile(style, &progression, &options);
    assert_eq!(pattern.substitutions, ["Xyz7", "???"]);
    assert!(pattern.voice("bass").count() > 0);
}
