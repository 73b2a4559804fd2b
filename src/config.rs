use std::ops::{Range, RangeInclusive};

use crate::core::classify::Thresholds;
use crate::core::error::SimError;
use crate::core::sampler::Jitter;

/// Ranges a job's envelope is drawn from, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeBounds {
    pub min_ms: Range<u64>,
    pub max_ms: RangeInclusive<u64>,
}

impl Default for EnvelopeBounds {
    fn default() -> Self {
        Self {
            min_ms: 1..256,
            max_ms: 256..=1536,
        }
    }
}

/// Configuration for a simulated batch.
///
/// The defaults reproduce the stock run: up to 19 sequential jobs of 100
/// steps each, colored output, real time.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Progress steps per job, also the bar width in glyphs
    pub steps: u32,
    /// Display width of the job id column
    pub id_width: usize,
    pub envelope: EnvelopeBounds,
    pub jitter: Jitter,
    pub thresholds: Thresholds,
    /// Range the requested job count is drawn from
    pub job_count: Range<u32>,
    /// Fixed requested job count, bypassing the random draw
    pub jobs: Option<u32>,
    /// Seed for the batch generator. Entropy when absent.
    pub seed: Option<u64>,
    /// Run every job on its own thread
    pub parallel: bool,
    /// Emit ANSI colors
    pub color: bool,
    /// Advance a virtual clock instead of sleeping
    pub virtual_time: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            id_width: 16,
            envelope: EnvelopeBounds::default(),
            jitter: Jitter::default(),
            thresholds: Thresholds::default(),
            job_count: 2..20,
            jobs: None,
            seed: None,
            parallel: false,
            color: true,
            virtual_time: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.steps == 0 {
            return Err(invalid("steps must be at least 1"));
        }
        if self.id_width < 3 {
            return Err(invalid("id width must be at least 3"));
        }
        if self.envelope.min_ms.is_empty() || self.envelope.max_ms.is_empty() {
            return Err(invalid("envelope ranges must not be empty"));
        }
        if self.envelope.min_ms.end > *self.envelope.max_ms.start() + 1 {
            return Err(invalid("envelope minimum may exceed its maximum"));
        }
        for (name, p) in [
            ("slow outlier", self.jitter.slow_outlier),
            ("fast outlier", self.jitter.fast_outlier),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{name} probability {p} is outside [0, 1]")));
            }
        }
        let t = &self.thresholds;
        if !(t.fast_pct <= t.slow_pct && t.slow_pct <= t.timeout_pct) {
            return Err(invalid("thresholds must satisfy fast <= slow <= timeout"));
        }
        if self.jobs.is_none() && self.job_count.is_empty() {
            return Err(invalid("job count range must not be empty"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfig {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_probability() {
        let config = SimulationConfig {
            jitter: Jitter {
                slow_outlier: 1.5,
                fast_outlier: 0.0,
            },
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_overlapping_envelope() {
        let config = SimulationConfig {
            envelope: EnvelopeBounds {
                min_ms: 1..500,
                max_ms: 256..=1536,
            },
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let config = SimulationConfig {
            thresholds: Thresholds {
                timeout_pct: 100,
                slow_pct: 110,
                fast_pct: 90,
            },
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
