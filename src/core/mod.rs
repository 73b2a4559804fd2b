pub mod batch;
pub mod classify;
pub mod clock;
pub mod error;
pub mod formatter;
pub mod job;
pub mod progress;
pub mod sampler;
pub mod simulator;
pub mod sink;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SimulationConfig;

pub use batch::{BatchResult, BatchRunner, Tally};
pub use classify::{ColorTag, Thresholds};
pub use clock::{Clock, Interrupter, ManualClock, SystemClock};
pub use error::SimError;
pub use job::{JobEnd, JobEnvelope, JobId, JobOutcome, JobPlan, JobStatus, ProgressState};
pub use progress::ProgressRenderer;
pub use sampler::{DurationSampler, Jitter};
pub use simulator::{Decision, JobSimulator};
pub use sink::{LineMode, LineSink, RecordingSink, RegionSink};

/// Batch generator: seeded when the config carries a seed.
pub fn batch_rng(config: &SimulationConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
