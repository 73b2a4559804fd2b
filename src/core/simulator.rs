use std::time::Duration;

use rand::Rng;

use crate::config::SimulationConfig;
use crate::core::classify::{ColorTag, Thresholds};
use crate::core::clock::Clock;
use crate::core::error::SimError;
use crate::core::formatter::{
    format_done_line, format_header_line, format_interrupted_line, format_running_line,
    format_timeout_line,
};
use crate::core::job::{JobEnd, JobId, JobOutcome, JobPlan, JobStatus, ProgressState};
use crate::core::progress::ProgressRenderer;
use crate::core::sampler::DurationSampler;
use crate::core::sink::LineSink;

/// What the job loop does next for an observed progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Still running: draw the line in `tag` and sleep.
    Continue { tag: ColorTag, remaining: Duration },
    /// Elapsed time passed the timeout limit.
    TimedOut,
    /// All steps done.
    Finished { status: JobStatus, tag: ColorTag },
}

/// Runs one job's 100-step lifecycle.
#[derive(Debug, Clone)]
pub struct JobSimulator {
    steps: u32,
    thresholds: Thresholds,
    renderer: ProgressRenderer,
    sampler: DurationSampler,
}

impl JobSimulator {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            steps: config.steps,
            thresholds: config.thresholds,
            renderer: ProgressRenderer::new(config.steps, config.id_width),
            sampler: DurationSampler::new(config.jitter),
        }
    }

    /// Draws a fresh id and envelope.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R, config: &SimulationConfig) -> JobPlan {
        let id = JobId::random(rng);
        let envelope = self.sampler.envelope(rng, &config.envelope);
        JobPlan::new(id, envelope, self.steps)
    }

    /// Pure transition from the current progress to the next action.
    pub fn decide(&self, plan: &JobPlan, progress: &ProgressState) -> Decision {
        if progress.step() >= self.steps {
            let (status, tag) = self.thresholds.settle(plan.expected, progress.elapsed());
            return Decision::Finished { status, tag };
        }
        if self.thresholds.is_timed_out(plan.expected, progress.elapsed()) {
            return Decision::TimedOut;
        }
        let tag = self
            .thresholds
            .classify(plan.expected, progress.projected(self.steps));
        Decision::Continue {
            tag,
            remaining: progress.remaining(self.steps),
        }
    }

    /// Runs `plan` to a terminal state. Interruption is absorbed into
    /// `JobStatus::Failure`; only sink errors escape.
    pub fn run<R, C, S>(
        &self,
        plan: &JobPlan,
        rng: &mut R,
        clock: &mut C,
        sink: &mut S,
    ) -> Result<JobOutcome, SimError>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
        S: LineSink + ?Sized,
    {
        tracing::debug!(
            job_id = %plan.id,
            min_ms = plan.envelope.min_ms,
            max_ms = plan.envelope.max_ms,
            expected_ms = plan.expected.as_millis() as u64,
            "Job started"
        );
        sink.append(&format_header_line(&plan.id, plan.expected))?;

        let start = clock.now();
        let mut progress = ProgressState::new();
        loop {
            progress.observe(clock.now().saturating_sub(start));
            let bar = self
                .renderer
                .render(&plan.id, progress.step(), progress.elapsed());

            match self.decide(plan, &progress) {
                Decision::Continue { tag, remaining } => {
                    sink.overwrite(&format_running_line(&bar, tag, remaining))?;
                    let delay = self.sampler.sample_delay(rng, &plan.envelope);
                    match clock.sleep(delay) {
                        Ok(()) => progress.advance(),
                        Err(SimError::Interrupted) => {
                            tracing::warn!(
                                job_id = %plan.id,
                                step = progress.step(),
                                "Job interrupted"
                            );
                            sink.append(&format_interrupted_line(&bar))?;
                            return Ok(self.outcome(plan, &progress, JobEnd::Interrupted));
                        }
                        Err(other) => return Err(other),
                    }
                }
                Decision::TimedOut => {
                    tracing::warn!(
                        job_id = %plan.id,
                        step = progress.step(),
                        elapsed_ms = progress.elapsed().as_millis() as u64,
                        "Job timed out"
                    );
                    sink.append(&format_timeout_line(&bar))?;
                    return Ok(self.outcome(plan, &progress, JobEnd::TimedOut));
                }
                Decision::Finished { status, tag } => {
                    sink.append(&format_done_line(&bar, tag))?;
                    let outcome = JobOutcome {
                        id: plan.id.clone(),
                        status,
                        end: JobEnd::Done,
                        tag,
                        expected: plan.expected,
                        elapsed: progress.elapsed(),
                        steps_completed: progress.step(),
                    };
                    tracing::debug!(
                        job_id = %plan.id,
                        status = ?status,
                        elapsed_ms = progress.elapsed().as_millis() as u64,
                        "Job finished"
                    );
                    return Ok(outcome);
                }
            }
        }
    }

    fn outcome(&self, plan: &JobPlan, progress: &ProgressState, end: JobEnd) -> JobOutcome {
        JobOutcome {
            id: plan.id.clone(),
            status: JobStatus::Failure,
            end,
            tag: ColorTag::Critical,
            expected: plan.expected,
            elapsed: progress.elapsed(),
            steps_completed: progress.step(),
        }
    }
}
