use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::core::clock::{Clock, Interrupter};
use crate::core::error::SimError;
use crate::core::formatter::format_summary_line;
use crate::core::job::{JobOutcome, JobPlan, JobStatus};
use crate::core::simulator::JobSimulator;
use crate::core::sink::{LineMode, LineSink, RegionSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub success: usize,
    pub warning: usize,
    pub failure: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.success + self.warning + self.failure
    }
}

impl<'a> FromIterator<&'a JobStatus> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a JobStatus>>(iter: I) -> Self {
        let mut tally = Tally::default();
        for status in iter {
            match status {
                JobStatus::Success => tally.success += 1,
                JobStatus::Warning => tally.warning += 1,
                JobStatus::Failure => tally.failure += 1,
            }
        }
        tally
    }
}

/// Outcomes of one batch, in job order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Job count drawn for the batch. One more than the jobs run.
    pub requested: u32,
    pub elapsed: Duration,
    pub outcomes: Vec<JobOutcome>,
}

impl BatchResult {
    pub fn statuses(&self) -> impl Iterator<Item = &JobStatus> {
        self.outcomes.iter().map(|outcome| &outcome.status)
    }

    pub fn tally(&self) -> Tally {
        self.statuses().collect()
    }

    pub fn summary_line(&self) -> String {
        format_summary_line(self.requested, self.elapsed, &self.tally())
    }
}

struct RowLine {
    row: usize,
    mode: LineMode,
    text: String,
}

// Forwards one job's lines to the region owner.
struct RowSink {
    row: usize,
    tx: mpsc::Sender<RowLine>,
}

impl LineSink for RowSink {
    fn write_line(&mut self, line: &str, mode: LineMode) -> Result<(), SimError> {
        // the receiver only hangs up after every job is joined
        let _ = self.tx.send(RowLine {
            row: self.row,
            mode,
            text: line.to_string(),
        });
        Ok(())
    }
}

pub struct BatchRunner {
    config: SimulationConfig,
    simulator: JobSimulator,
    interrupter: Option<Arc<Interrupter>>,
}

impl BatchRunner {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let simulator = JobSimulator::new(&config);
        Ok(Self {
            config,
            simulator,
            interrupter: None,
        })
    }

    /// Stops starting new jobs once `interrupter` is aborted.
    pub fn abort_on(mut self, interrupter: Arc<Interrupter>) -> Self {
        self.interrupter = Some(interrupter);
        self
    }

    /// Requested job count: fixed by config or drawn uniformly from its range.
    pub fn draw_job_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self.config.jobs {
            Some(jobs) => jobs,
            None => rng.gen_range(self.config.job_count.clone()),
        }
    }

    /// Runs the batch one job after another, then writes the summary.
    ///
    /// For a requested count `n`, jobs `1..n` run, so `n - 1` in total.
    pub fn run<R, C, S>(
        &self,
        rng: &mut R,
        clock: &mut C,
        sink: &mut S,
    ) -> Result<BatchResult, SimError>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
        S: LineSink + ?Sized,
    {
        let requested = self.draw_job_count(rng);
        tracing::info!(requested, "Batch started");

        let start = clock.now();
        let mut outcomes = Vec::new();
        for index in 1..requested {
            if self.aborted() {
                tracing::warn!(index, "Batch aborted, skipping remaining jobs");
                break;
            }
            let plan = self.simulator.plan(rng, &self.config);
            outcomes.push(self.simulator.run(&plan, rng, clock, sink)?);
        }

        let result = BatchResult {
            requested,
            elapsed: clock.now().saturating_sub(start),
            outcomes,
        };
        self.finish(&result, sink)?;
        Ok(result)
    }

    /// Runs every job on its own thread, one region row per job.
    ///
    /// Each job gets its own clock from `make_clock` and its own generator
    /// seeded from `rng`. Wall time is the larger of the batch clock delta
    /// and the longest job.
    pub fn run_parallel<R, C, F, S>(
        &self,
        rng: &mut R,
        make_clock: F,
        region: &mut S,
    ) -> Result<BatchResult, SimError>
    where
        R: Rng + ?Sized,
        C: Clock + Send,
        F: Fn() -> C + Sync,
        S: RegionSink + ?Sized,
    {
        let requested = self.draw_job_count(rng);
        tracing::info!(requested, parallel = true, "Batch started");

        let jobs: Vec<(JobPlan, u64)> = (1..requested)
            .map(|_| (self.simulator.plan(rng, &self.config), rng.gen::<u64>()))
            .collect();

        let batch_clock = make_clock();
        let start = batch_clock.now();
        region.reserve(jobs.len())?;

        let (tx, rx) = mpsc::channel::<RowLine>();
        let results: Vec<Result<JobOutcome, SimError>> = thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .enumerate()
                .map(|(row, (plan, seed))| {
                    let mut sink = RowSink { row, tx: tx.clone() };
                    let mut clock = make_clock();
                    let simulator = &self.simulator;
                    let seed = *seed;
                    scope.spawn(move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        simulator.run(plan, &mut rng, &mut clock, &mut sink)
                    })
                })
                .collect();
            drop(tx);

            let mut draw_error = None;
            for line in rx {
                if draw_error.is_none() {
                    if let Err(err) = region.draw(line.row, &line.text, line.mode) {
                        draw_error = Some(err);
                    }
                }
            }

            let mut results: Vec<Result<JobOutcome, SimError>> = handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(SimError::Terminal {
                            message: "job thread panicked".to_string(),
                        })
                    })
                })
                .collect();
            if let Some(err) = draw_error {
                results.push(Err(err));
            }
            results
        });
        region.release()?;

        let outcomes = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        let longest = outcomes
            .iter()
            .map(|outcome| outcome.elapsed)
            .max()
            .unwrap_or_default();
        let result = BatchResult {
            requested,
            elapsed: batch_clock.now().saturating_sub(start).max(longest),
            outcomes,
        };
        self.finish(&result, region)?;
        Ok(result)
    }

    fn aborted(&self) -> bool {
        self.interrupter
            .as_ref()
            .map(|interrupter| interrupter.is_aborted())
            .unwrap_or(false)
    }

    fn finish<S>(&self, result: &BatchResult, sink: &mut S) -> Result<(), SimError>
    where
        S: LineSink + ?Sized,
    {
        let tally = result.tally();
        tracing::info!(
            requested = result.requested,
            ran = tally.total(),
            success = tally.success,
            warning = tally.warning,
            failure = tally.failure,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Batch finished"
        );
        sink.append(&result.summary_line())
    }
}
