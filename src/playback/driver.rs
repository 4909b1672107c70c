//! Periodic driver: Ticks the scheduler from a dedicated thread.
//!
//! Ticks never overlap: if the scheduler is still busy (or the previous tick
//! overran its period) the missed deadlines are skipped and counted, never
//! queued.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use super::diagnostics::Diagnostics;
use super::scheduler::LookaheadScheduler;

/// Background tick thread for one scheduler.
pub struct Driver {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Driver {
    /// Start ticking `scheduler` every `period`.
    pub fn spawn(
        scheduler: Arc<Mutex<LookaheadScheduler>>,
        diagnostics: Arc<Diagnostics>,
        period: Duration,
    ) -> io::Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();
        let period = period.max(Duration::from_millis(1));

        let thread = thread::Builder::new()
            .name("backbeat-driver".into())
            .spawn(move || {
                let mut deadline = Instant::now();
                while !stop_clone.load(Ordering::Acquire) {
                    match scheduler.try_lock() {
                        Ok(mut s) => {
                            s.tick();
                        }
                        Err(TryLockError::Poisoned(poisoned)) => {
                            poisoned.into_inner().tick();
                        }
                        Err(TryLockError::WouldBlock) => {
                            diagnostics.record_skipped_ticks(1);
                        }
                    }

                    deadline += period;
                    let now = Instant::now();
                    if now >= deadline {
                        let missed = ((now - deadline).as_nanos() / period.as_nanos()) as u64;
                        if missed > 0 {
                            debug!(missed, "tick overran, skipping");
                            diagnostics.record_skipped_ticks(missed);
                        }
                        deadline = now;
                    } else {
                        thread::park_timeout(deadline - now);
                    }
                }
            })?;

        Ok(Self {
            stop_flag,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Signal the thread to stop and wait for it.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            let _ = thread.join();
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.stop();
    }
}
