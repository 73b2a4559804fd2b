use std::fmt;
use std::time::Duration;

use rand::Rng;
use uuid::Builder;

use crate::core::classify::ColorTag;

/// Printable job identifier, a 32 char lowercase hex token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Draws a random v4 token from `rng` so seeded batches get stable ids.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; 16] = rng.gen();
        let uuid = Builder::from_random_bytes(bytes).into_uuid();
        Self(uuid.simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-step delay range in milliseconds, drawn once per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobEnvelope {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl JobEnvelope {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Baseline ETA: envelope midpoint times the step count.
    pub fn expected(&self, steps: u32) -> Duration {
        let midpoint = (self.min_ms + self.max_ms) / 2;
        Duration::from_millis(midpoint * u64::from(steps))
    }
}

/// Everything fixed at job start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    pub id: JobId,
    pub envelope: JobEnvelope,
    pub expected: Duration,
}

impl JobPlan {
    pub fn new(id: JobId, envelope: JobEnvelope, steps: u32) -> Self {
        let expected = envelope.expected(steps);
        Self {
            id,
            envelope,
            expected,
        }
    }
}

/// Live progress of a running job. Owned by the simulation loop only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    step: u32,
    elapsed: Duration,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(step: u32, elapsed: Duration) -> Self {
        Self { step, elapsed }
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn observe(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Average time per step, counting the step being attempted.
    pub fn running_average(&self) -> Duration {
        self.elapsed / (self.step + 1)
    }

    pub fn projected(&self, steps: u32) -> Duration {
        self.running_average() * steps
    }

    pub fn remaining(&self, steps: u32) -> Duration {
        self.running_average() * steps.saturating_sub(self.step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Finished within the slow limit.
    Success,
    /// Finished, but at or beyond the slow limit.
    Warning,
    /// Never finished: timed out or interrupted.
    Failure,
}

/// How the job loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEnd {
    Done,
    TimedOut,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub id: JobId,
    pub status: JobStatus,
    pub end: JobEnd,
    pub tag: ColorTag,
    pub expected: Duration,
    pub elapsed: Duration,
    pub steps_completed: u32,
}
