use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failures of the CPU/GPU synchronisation primitive. None of these are
/// recoverable for the frame that hit them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("fence value {requested} was never signalled (last signal {signalled})")]
    NeverSignalled { requested: u64, signalled: u64 },
    #[error("fence value {value} is not greater than the last signal {last}")]
    NonMonotonic { value: u64, last: u64 },
    #[error("unbounded wait for fence value {0} returned without completing")]
    WaitAbandoned(u64),
    #[error("gpu timeline lost: {0}")]
    Lost(String),
}

/// Monotonic completion counter shared with the GPU queue.
pub trait GpuTimeline {
    /// Highest value the GPU has finished.
    fn completed_value(&self) -> u64;

    /// Enqueues a signal of `value` behind all previously submitted work.
    fn signal(&self, value: u64) -> Result<(), SyncError>;

    /// Blocks until `completed_value() >= value`. `Ok(false)` means the
    /// timeout elapsed first; `None` waits without limit.
    fn wait_for(&self, value: u64, timeout: Option<Duration>) -> Result<bool, SyncError>;
}

#[derive(Debug, Default)]
struct TimelineState {
    signalled: u64,
    completed: u64,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<TimelineState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process timeline. Signals are queued by the submitting side and
/// retired by a [`TimelineCompleter`], usually on another thread; in
/// immediate mode every signal completes on the spot.
#[derive(Debug, Clone)]
pub struct CpuTimeline {
    shared: Arc<Shared>,
    immediate: bool,
}

impl CpuTimeline {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            immediate: false,
        }
    }

    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::new()
        }
    }

    pub fn completer(&self) -> TimelineCompleter {
        TimelineCompleter {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn signalled_value(&self) -> u64 {
        self.shared.lock().signalled
    }
}

impl Default for CpuTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuTimeline for CpuTimeline {
    fn completed_value(&self) -> u64 {
        self.shared.lock().completed
    }

    fn signal(&self, value: u64) -> Result<(), SyncError> {
        let mut state = self.shared.lock();
        if value <= state.signalled {
            return Err(SyncError::NonMonotonic {
                value,
                last: state.signalled,
            });
        }
        state.signalled = value;
        if self.immediate {
            state.completed = value;
        }
        drop(state);
        self.shared.changed.notify_all();
        Ok(())
    }

    fn wait_for(&self, value: u64, timeout: Option<Duration>) -> Result<bool, SyncError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.shared.lock();
        loop {
            if state.completed >= value {
                return Ok(true);
            }
            if value > state.signalled {
                return Err(SyncError::NeverSignalled {
                    requested: value,
                    signalled: state.signalled,
                });
            }
            state = match deadline {
                None => self
                    .shared
                    .changed
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    self.shared
                        .changed
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

/// Executing side of a [`CpuTimeline`].
#[derive(Debug, Clone)]
pub struct TimelineCompleter {
    shared: Arc<Shared>,
}

impl TimelineCompleter {
    /// Marks work up to `value` finished. Values beyond the last signal are
    /// clamped to it; the counter never goes backwards.
    pub fn complete(&self, value: u64) {
        let mut state = self.shared.lock();
        let value = value.min(state.signalled);
        if value > state.completed {
            state.completed = value;
            drop(state);
            self.shared.changed.notify_all();
        }
    }

    pub fn complete_all(&self) {
        let signalled = self.shared.lock().signalled;
        self.complete(signalled);
    }

    pub fn pending(&self) -> u64 {
        let state = self.shared.lock();
        state.signalled - state.completed
    }

    /// Waits until something above `after` has been signalled and returns
    /// the newest signal, or `None` on timeout.
    pub fn wait_for_signal(&self, after: u64, timeout: Duration) -> Option<u64> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        loop {
            if state.signalled > after {
                return Some(state.signalled);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            state = self
                .shared
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}
