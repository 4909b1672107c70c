//! Transport controller: The public façade over one scheduler.
//!
//! Setters validate at the boundary and publish through [`Controls`] atomics,
//! so they never wait on a tick in progress. Each controller owns exactly one
//! [`LookaheadScheduler`]; several controllers can run side by side.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::controls::Controls;
use super::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use super::driver::Driver;
use super::scheduler::{LookaheadScheduler, SchedulerState, TickReport};
use super::trigger::SoundTrigger;
use crate::articulation::ArticulationTable;
use crate::config::EngineConfig;
use crate::error::TransportError;
use crate::event::{Tempo, TimeSignature};
use crate::pattern::Arrangement;

pub struct TransportController {
    scheduler: Arc<Mutex<LookaheadScheduler>>,
    controls: Arc<Controls>,
    diagnostics: Arc<Diagnostics>,
    driver: Option<Driver>,
    /// `None` when the caller ticks by hand.
    tick_interval: Option<Duration>,
}

impl TransportController {
    /// A controller on the system clock, ticked by its own driver thread
    /// while running.
    pub fn new(
        arrangement: Arrangement,
        trigger: impl SoundTrigger + 'static,
        config: &EngineConfig,
    ) -> Self {
        let mut controller = Self::build(
            arrangement,
            Arc::new(SystemClock::new()),
            Box::new(trigger),
            config,
        );
        controller.tick_interval = Some(config.tick_interval());
        controller
    }

    /// A controller with no driver thread; the caller calls [`tick`](Self::tick).
    pub fn manual(
        arrangement: Arrangement,
        clock: Arc<dyn Clock>,
        trigger: impl SoundTrigger + 'static,
        config: &EngineConfig,
    ) -> Self {
        Self::build(arrangement, clock, Box::new(trigger), config)
    }

    fn build(
        arrangement: Arrangement,
        clock: Arc<dyn Clock>,
        trigger: Box<dyn SoundTrigger>,
        config: &EngineConfig,
    ) -> Self {
        let tempo = Tempo::new(config.default_tempo).unwrap_or_default();
        let controls = Arc::new(Controls::new(
            tempo,
            config.default_intensity,
            TimeSignature::COMMON,
        ));
        let diagnostics = Arc::new(Diagnostics::new());
        let scheduler = LookaheadScheduler::new(
            arrangement,
            clock,
            trigger,
            controls.clone(),
            diagnostics.clone(),
            config,
        );
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            controls,
            diagnostics,
            driver: None,
            tick_interval: None,
        }
    }

    fn scheduler(&self) -> MutexGuard<'_, LookaheadScheduler> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin playback. While already running this returns the current
    /// session id and changes nothing.
    pub fn start(&mut self) -> Result<u64, TransportError> {
        let id = self.scheduler().start();
        if let (Some(interval), true) = (self.tick_interval, self.driver.is_none()) {
            match Driver::spawn(self.scheduler.clone(), self.diagnostics.clone(), interval) {
                Ok(driver) => self.driver = Some(driver),
                Err(err) => {
                    self.scheduler().stop();
                    return Err(TransportError::DriverSpawn(err.to_string()));
                }
            }
        }
        Ok(id)
    }

    /// Stop playback. When this returns every outstanding sound has been
    /// cancelled and no further triggers will be issued.
    pub fn stop(&mut self) {
        self.controls.set_running(false);
        self.scheduler().stop();
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
    }

    /// Change tempo from the next step on. Values outside 40–200 BPM are
    /// clamped; non-positive or non-finite values are refused.
    pub fn set_tempo(&self, bpm: f64) -> Result<(), TransportError> {
        let tempo = Tempo::new(bpm)?;
        self.controls.set_tempo(tempo);
        debug!(bpm = tempo.bpm(), "tempo set");
        Ok(())
    }

    /// Change meter. The loop is recompiled on the next tick and playback
    /// restarts from the top of the current measure.
    pub fn set_time_signature(&self, numerator: u8, denominator: u8) -> Result<(), TransportError> {
        let meter = TimeSignature::new(numerator, denominator)?;
        self.controls.set_meter(meter);
        info!(numerator, denominator, "time signature set");
        Ok(())
    }

    /// Intensity in `[0, 1]`, applied from the next tick.
    pub fn set_intensity(&self, level: f64) {
        self.controls.set_intensity(level);
    }

    /// Humanization in beats, applied from the next loop cycle.
    pub fn set_humanize(&self, enabled: bool, amount: f64) {
        self.controls.set_humanize(enabled, amount);
    }

    /// New style, progression, length or swing, applied at the next loop wrap.
    pub fn set_arrangement(&self, arrangement: Arrangement) {
        self.scheduler().set_arrangement(arrangement);
    }

    /// Swap the articulation palette without recompiling.
    pub fn set_palette(&self, palette: ArticulationTable) {
        self.scheduler().set_palette(palette);
    }

    /// Run one scheduling pass now.
    pub fn tick(&self) -> TickReport {
        self.scheduler().tick()
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler().state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Current session id, if playing.
    pub fn session_id(&self) -> Option<u64> {
        self.scheduler().session().map(|s| s.id())
    }

    /// Handles that may still sound.
    pub fn pending_handles(&self) -> usize {
        self.scheduler().pending_handles()
    }

    pub fn tempo(&self) -> Tempo {
        self.controls.tempo()
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.controls.meter()
    }

    pub fn intensity(&self) -> f64 {
        self.controls.intensity()
    }

    pub fn humanize(&self) -> (bool, f64) {
        self.controls.humanize()
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }
}

impl Drop for TransportController {
    fn drop(&mut self) {
        self.stop();
    }
}
