use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::core::error::SimError;

/// Time source and the only blocking point of a job.
pub trait Clock {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Waits for `delay`. `Err(SimError::Interrupted)` when cancelled.
    fn sleep(&mut self, delay: Duration) -> Result<(), SimError>;
}

#[derive(Debug, Default)]
struct InterruptState {
    generation: u64,
    aborted: bool,
}

/// Cancellation shared between the key watcher and sleeping jobs.
///
/// Every interrupt bumps a generation counter. Each clock remembers the
/// last generation it consumed, so an interrupt raised between two sleeps
/// still fails the next one. `abort` stays set and fails every later sleep.
#[derive(Debug, Default)]
pub struct Interrupter {
    state: Mutex<InterruptState>,
    wake: Condvar,
}

impl Interrupter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn interrupt(&self) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        self.wake.notify_all();
    }

    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        state.generation = state.generation.wrapping_add(1);
        self.wake.notify_all();
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Blocks up to `delay`. Returns `false` if an interrupt newer than
    /// `seen` is pending or arrives meanwhile; `seen` is then caught up.
    pub fn wait(&self, delay: Duration, seen: &mut u64) -> bool {
        let guard = self.lock();
        if guard.aborted || guard.generation != *seen {
            *seen = guard.generation;
            return false;
        }
        let target = *seen;
        let (guard, timed_out) = match self
            .wake
            .wait_timeout_while(guard, delay, |state| state.generation == target)
        {
            Ok((guard, result)) => (guard, result.timed_out()),
            Err(poisoned) => {
                let (guard, result) = poisoned.into_inner();
                (guard, result.timed_out())
            }
        };
        *seen = guard.generation;
        timed_out
    }

    fn lock(&self) -> MutexGuard<'_, InterruptState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Wall clock whose sleeps can be interrupted.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    interrupter: Arc<Interrupter>,
    consumed: u64,
}

impl SystemClock {
    /// Interrupts raised before this point do not affect the clock.
    pub fn new(interrupter: Arc<Interrupter>) -> Self {
        let consumed = interrupter.generation();
        Self {
            origin: Instant::now(),
            interrupter,
            consumed,
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, delay: Duration) -> Result<(), SimError> {
        if self.interrupter.wait(delay, &mut self.consumed) {
            Ok(())
        } else {
            Err(SimError::Interrupted)
        }
    }
}

/// Virtual clock: sleeping advances time by exactly the delay.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, delay: Duration) -> Result<(), SimError> {
        self.advance(delay);
        Ok(())
    }
}
