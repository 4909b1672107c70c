//! The sound-trigger seam.
//!
//! The scheduler never makes sound itself: it hands each due event to a
//! [`SoundTrigger`] with an absolute target time and keeps the returned
//! handle until the sound has ended, so `stop()` can cancel it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::error::TriggerError;

/// One fire-and-forget request to the sound collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRequest {
    pub voice: String,
    /// Note name for pitched events, voice name for hits.
    pub pitch: String,
    pub duration_secs: f64,
    /// Absolute clock time the sound should start.
    pub at: f64,
    pub velocity: f32,
}

/// Identifies a scheduled sound so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerHandle(pub u64);

/// The sound-producing collaborator.
pub trait SoundTrigger: Send {
    /// Schedule a sound. Failing is non-fatal: the scheduler skips the event.
    fn trigger(&mut self, request: &TriggerRequest) -> Result<TriggerHandle, TriggerError>;

    /// Cancel a scheduled or sounding event. Unknown handles are ignored.
    fn cancel(&mut self, handle: TriggerHandle);
}

impl<T: SoundTrigger + ?Sized> SoundTrigger for Box<T> {
    fn trigger(&mut self, request: &TriggerRequest) -> Result<TriggerHandle, TriggerError> {
        (**self).trigger(request)
    }

    fn cancel(&mut self, handle: TriggerHandle) {
        (**self).cancel(handle)
    }
}

/// A request as seen by a [`RecordingTrigger`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTrigger {
    pub handle: TriggerHandle,
    pub request: TriggerRequest,
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct LogInner {
    next_handle: u64,
    entries: Vec<RecordedTrigger>,
    known_voices: Option<HashSet<String>>,
    rejected: Vec<TriggerRequest>,
}

/// Shared view of everything a [`RecordingTrigger`] was asked to do.
#[derive(Debug, Clone, Default)]
pub struct TriggerLog {
    inner: Arc<Mutex<LogInner>>,
}

impl TriggerLog {
    fn with<R>(&self, f: impl FnOnce(&mut LogInner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Every accepted request, in call order.
    pub fn calls(&self) -> Vec<RecordedTrigger> {
        self.with(|inner| inner.entries.clone())
    }

    pub fn len(&self) -> usize {
        self.with(|inner| inner.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requests refused with `UnknownVoice`.
    pub fn rejected(&self) -> Vec<TriggerRequest> {
        self.with(|inner| inner.rejected.clone())
    }

    /// Requests that would have sounded by `now`: target time reached and not cancelled.
    pub fn fired_by(&self, now: f64) -> Vec<TriggerRequest> {
        self.with(|inner| {
            inner
                .entries
                .iter()
                .filter(|e| !e.cancelled && e.request.at <= now)
                .map(|e| e.request.clone())
                .collect()
        })
    }

    /// Requests for one voice, in call order.
    pub fn for_voice(&self, voice: &str) -> Vec<TriggerRequest> {
        self.with(|inner| {
            inner
                .entries
                .iter()
                .filter(|e| e.request.voice == voice)
                .map(|e| e.request.clone())
                .collect()
        })
    }

    pub fn clear(&self) {
        self.with(|inner| {
            inner.entries.clear();
            inner.rejected.clear();
        })
    }
}

/// Test collaborator that records requests instead of making sound.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrigger {
    log: TriggerLog,
}

impl RecordingTrigger {
    /// Accepts every voice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts only the listed voices; others fail with `UnknownVoice`.
    pub fn with_voices<S: Into<String>>(voices: impl IntoIterator<Item = S>) -> Self {
        let trigger = Self::default();
        let voices = voices.into_iter().map(Into::into).collect();
        trigger.log.with(|inner| inner.known_voices = Some(voices));
        trigger
    }

    /// A handle on the shared log.
    pub fn log(&self) -> TriggerLog {
        self.log.clone()
    }
}

impl SoundTrigger for RecordingTrigger {
    fn trigger(&mut self, request: &TriggerRequest) -> Result<TriggerHandle, TriggerError> {
        self.log.with(|inner| {
            if let Some(known) = &inner.known_voices {
                if !known.contains(&request.voice) {
                    inner.rejected.push(request.clone());
                    return Err(TriggerError::UnknownVoice(request.voice.clone()));
                }
            }
            inner.next_handle += 1;
            let handle = TriggerHandle(inner.next_handle);
            inner.entries.push(RecordedTrigger {
                handle,
                request: request.clone(),
                cancelled: false,
            });
            Ok(handle)
        })
    }

    fn cancel(&mut self, handle: TriggerHandle) {
        self.log.with(|inner| {
            if let Some(entry) = inner.entries.iter_mut().find(|e| e.handle == handle) {
                entry.cancelled = true;
            }
        })
    }
}

/// Logs each request through `tracing` instead of making sound.
#[derive(Debug, Default)]
pub struct ConsoleTrigger {
    next_handle: u64,
}

impl ConsoleTrigger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SoundTrigger for ConsoleTrigger {
    fn trigger(&mut self, request: &TriggerRequest) -> Result<TriggerHandle, TriggerError> {
        self.next_handle += 1;
        info!(
            at = format_args!("{:.3}", request.at),
            voice = %request.voice,
            pitch = %request.pitch,
            velocity = format_args!("{:.2}", request.velocity),
            duration = format_args!("{:.3}", request.duration_secs),
            "trigger"
        );
        Ok(TriggerHandle(self.next_handle))
    }

    fn cancel(&mut self, _handle: TriggerHandle) {}
}
