//! Look-ahead scheduler: The real-time core.
//!
//! Each tick scans the window `[now, now + lookahead)` and hands every event
//! that falls inside it to the [`SoundTrigger`] with its exact target time.
//! Musical time advances one grid step at a time; seconds are derived from
//! the tempo current at the step being scheduled, so a tempo change only
//! moves beats that have not been scheduled yet.
//!
//! The scheduler does not own a thread. Something calls [`tick`] every
//! ~25 ms: the [`Driver`](super::driver::Driver) in production, the test
//! itself with a [`ManualClock`](super::clock::ManualClock) otherwise.
//!
//! [`tick`]: LookaheadScheduler::tick

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::clock::Clock;
use super::controls::Controls;
use super::diagnostics::Diagnostics;
use super::session::PlaybackSession;
use super::trigger::{SoundTrigger, TriggerRequest};
use crate::articulation::{Articulation, ArticulationTable};
use crate::config::EngineConfig;
use crate::error::TriggerError;
use crate::event::{Beat, Event, PitchSpec, TimeSignature};
use crate::pattern::{Arrangement, CompiledPattern, PatternCompiler};
use crate::theory::note_name;

/// Ghost notes are silent below this intensity.
pub const GHOST_GATE: f64 = 0.3;

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopping,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Grid steps scheduled.
    pub steps: u32,
    pub triggered: u32,
    pub dropped_late: u32,
    /// Events refused by the sound collaborator.
    pub failed: u32,
    /// Ghost notes silenced by low intensity.
    pub gated: u32,
    /// Loop wraps crossed.
    pub wraps: u32,
}

/// Velocity multiplier for an intensity level in `[0, 1]`.
pub fn intensity_scale(level: f64) -> f64 {
    0.4 + 0.6 * level.clamp(0.0, 1.0)
}

pub struct LookaheadScheduler {
    clock: Arc<dyn Clock>,
    trigger: Box<dyn SoundTrigger>,
    controls: Arc<Controls>,
    diagnostics: Arc<Diagnostics>,
    compiler: PatternCompiler,

    arrangement: Arrangement,
    /// Arrangement waiting for the next loop wrap.
    pending_arrangement: Option<Arrangement>,
    palette: ArticulationTable,
    /// `palette` with the current style's overrides layered on.
    table: ArticulationTable,

    lookahead: f64,
    tick_period: f64,
    humanize_velocity: f32,
    seed: u64,

    state: SchedulerState,
    session: Option<PlaybackSession>,
    next_session_id: u64,
    /// Meter and humanize the current session was compiled with.
    meter: TimeSignature,
    humanize: (bool, f64),
}

impl LookaheadScheduler {
    pub fn new(
        arrangement: Arrangement,
        clock: Arc<dyn Clock>,
        trigger: Box<dyn SoundTrigger>,
        controls: Arc<Controls>,
        diagnostics: Arc<Diagnostics>,
        config: &EngineConfig,
    ) -> Self {
        let palette = ArticulationTable::new();
        let table = palette.with_overrides(&arrangement.style.articulations);
        let meter = controls.meter();
        Self {
            clock,
            trigger,
            controls,
            diagnostics,
            compiler: PatternCompiler::new(config.humanize_ceiling_beats),
            arrangement,
            pending_arrangement: None,
            palette,
            table,
            lookahead: config.lookahead_secs.max(0.0),
            tick_period: config.tick_period_secs(),
            humanize_velocity: config.humanize_velocity,
            seed: config.seed,
            state: SchedulerState::Idle,
            session: None,
            next_session_id: 1,
            meter,
            humanize: (false, 0.0),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    /// Handles that may still sound. Empty whenever no session exists.
    pub fn pending_handles(&self) -> usize {
        self.session.as_ref().map_or(0, PlaybackSession::pending_handles)
    }

    /// Idle → Running. Returns the session id; while already running this
    /// is the existing session's id and nothing changes.
    pub fn start(&mut self) -> u64 {
        if let (SchedulerState::Running, Some(session)) = (self.state, &self.session) {
            return session.id();
        }
        if let Some(arrangement) = self.pending_arrangement.take() {
            self.install_arrangement(arrangement);
        }
        self.meter = self.controls.meter();
        self.humanize = self.controls.humanize();
        let pattern = self.compile(0);

        let id = self.next_session_id;
        self.next_session_id += 1;
        let now = self.clock.now();
        self.session = Some(PlaybackSession::new(id, pattern, now));
        self.state = SchedulerState::Running;
        self.controls.set_running(true);
        info!(
            session = id,
            style = %self.arrangement.style.name,
            bpm = self.controls.tempo().bpm(),
            "playback started"
        );
        id
    }

    /// Running → Stopping → Idle. Cancels every outstanding handle before
    /// returning. Safe to call in any state, any number of times.
    pub fn stop(&mut self) {
        self.controls.set_running(false);
        let Some(session) = self.session.take() else {
            self.state = SchedulerState::Idle;
            return;
        };
        self.state = SchedulerState::Stopping;
        let id = session.id();
        let cancelled = session.pending.len();
        for (handle, _) in session.pending {
            self.trigger.cancel(handle);
        }
        self.state = SchedulerState::Idle;
        info!(session = id, cancelled, "playback stopped");
    }

    /// Replace the arrangement. Applied immediately when idle, otherwise at
    /// the next loop wrap.
    pub fn set_arrangement(&mut self, arrangement: Arrangement) {
        if self.session.is_some() {
            self.pending_arrangement = Some(arrangement);
        } else {
            self.install_arrangement(arrangement);
        }
    }

    /// Swap the articulation palette. Takes effect on the next trigger; the
    /// compiled pattern is untouched.
    pub fn set_palette(&mut self, palette: ArticulationTable) {
        self.table = palette.with_overrides(&self.arrangement.style.articulations);
        self.palette = palette;
    }

    fn install_arrangement(&mut self, arrangement: Arrangement) {
        self.table = self.palette.with_overrides(&arrangement.style.articulations);
        self.arrangement = arrangement;
    }

    fn compile(&self, cycle: u64) -> CompiledPattern {
        let (enabled, amount) = self.humanize;
        let amount = if enabled { amount } else { 0.0 };
        let pattern = self.compiler.compile_arrangement(
            &self.arrangement,
            self.meter,
            amount,
            self.humanize_velocity,
            self.seed.wrapping_add(cycle),
        );
        self.diagnostics
            .record_chord_substitutions(pattern.substitutions.len() as u64);
        pattern
    }

    /// Schedule everything due before `now + lookahead`.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.state != SchedulerState::Running || !self.controls.is_running() {
            return report;
        }
        let Some(mut session) = self.session.take() else {
            return report;
        };

        let now = self.clock.now();
        self.apply_meter_change(&mut session);
        session.retire(now);

        let horizon = now + self.lookahead;
        let late_limit = now - self.tick_period;
        let intensity = self.controls.intensity();

        while session.next_event_time < horizon {
            if !self.controls.is_running() {
                break;
            }
            let seconds_per_beat = self.controls.tempo().seconds_per_beat();
            let step_start = session.cursor;
            let step_end = (step_start + session.step.max(Beat::from_ticks(1))).min(session.loop_length);

            for event in session.timeline.drain_range(step_start, step_end) {
                let offset = (event.time - step_start).as_beats_f64() * seconds_per_beat;
                let at = session.next_event_time + offset;
                if at < late_limit {
                    debug!(voice = %event.voice, at, now, "dropping late event");
                    self.diagnostics.record_dropped_late();
                    report.dropped_late += 1;
                    continue;
                }
                self.fire(&mut session, &event, at, seconds_per_beat, intensity, &mut report);
            }

            session.next_event_time += (step_end - step_start).as_beats_f64() * seconds_per_beat;
            session.cursor = step_end;
            report.steps += 1;

            if session.cursor >= session.loop_length {
                self.wrap(&mut session);
                report.wraps += 1;
            }
        }

        self.session = Some(session);
        report
    }

    fn fire(
        &mut self,
        session: &mut PlaybackSession,
        event: &Event,
        at: f64,
        seconds_per_beat: f64,
        intensity: f64,
        report: &mut TickReport,
    ) {
        if event.articulation == Articulation::Ghost && intensity < GHOST_GATE {
            report.gated += 1;
            return;
        }
        let articulated = self.table.apply(event);
        let velocity = (articulated.velocity as f64 * intensity_scale(intensity)).clamp(0.0, 1.0);
        let duration_secs = articulated.duration_beats * seconds_per_beat;
        let pitch = match articulated.pitch {
            PitchSpec::Note(n) => note_name(n),
            PitchSpec::Hit => articulated.voice.clone(),
        };
        let request = TriggerRequest {
            voice: articulated.voice,
            pitch,
            duration_secs,
            at,
            velocity: velocity as f32,
        };

        match self.trigger.trigger(&request) {
            Ok(handle) => {
                session.pending.push((handle, at + duration_secs));
                self.diagnostics.record_triggered();
                report.triggered += 1;
            }
            Err(TriggerError::UnknownVoice(voice)) => {
                warn!(%voice, "unknown voice, skipping event");
                self.diagnostics.record_unknown_voice();
                report.failed += 1;
            }
            Err(err) => {
                warn!(%err, voice = %request.voice, "trigger failed, skipping event");
                self.diagnostics.record_trigger_failure();
                report.failed += 1;
            }
        }
    }

    /// Loop end reached: restart the timeline, recompiling when the
    /// arrangement changed or humanization needs a fresh cycle.
    fn wrap(&mut self, session: &mut PlaybackSession) {
        session.cycle += 1;
        let mut recompile = false;
        if let Some(arrangement) = self.pending_arrangement.take() {
            self.install_arrangement(arrangement);
            recompile = true;
        }
        let humanize = self.controls.humanize();
        if humanize != self.humanize || humanize.0 {
            self.humanize = humanize;
            recompile = true;
        }
        if recompile {
            let pattern = self.compile(session.cycle);
            session.load(pattern, Beat::ZERO);
            debug!(cycle = session.cycle, "recompiled at loop wrap");
        } else {
            session.cursor = Beat::ZERO;
            session.timeline.reset_cursor();
        }
    }

    /// A new meter recompiles the loop and restarts the current measure.
    fn apply_meter_change(&mut self, session: &mut PlaybackSession) {
        let meter = self.controls.meter();
        if meter == self.meter {
            return;
        }
        self.meter = meter;
        let pattern = self.compile(session.cycle);
        let mut cursor = session.cursor.quantize_to_bar(meter.bar_length());
        if cursor >= pattern.loop_length {
            cursor = Beat::ZERO;
        }
        info!(
            numerator = meter.numerator(),
            denominator = meter.denominator(),
            cursor = cursor.as_beats_f64(),
            "time signature changed"
        );
        session.load(pattern, cursor);
    }
}

impl Drop for LookaheadScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
