use std::time::Duration;

use rand::Rng;

use crate::config::EnvelopeBounds;
use crate::core::job::JobEnvelope;

/// Outlier injection probabilities, checked in order on every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    /// Chance of resampling from `[min, 2 * max]`.
    pub slow_outlier: f64,
    /// Chance of resampling from `[0, min]`, drawn only when the slow check missed.
    pub fast_outlier: f64,
}

impl Default for Jitter {
    fn default() -> Self {
        Self {
            slow_outlier: 0.05,
            fast_outlier: 0.04,
        }
    }
}

impl Jitter {
    pub fn none() -> Self {
        Self {
            slow_outlier: 0.0,
            fast_outlier: 0.0,
        }
    }

    /// Probabilities forced into `[0, 1]`; NaN counts as never.
    pub fn clamped(self) -> Self {
        let clamp = |p: f64| if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        Self {
            slow_outlier: clamp(self.slow_outlier),
            fast_outlier: clamp(self.fast_outlier),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DurationSampler {
    jitter: Jitter,
}

impl DurationSampler {
    pub fn new(jitter: Jitter) -> Self {
        Self {
            jitter: jitter.clamped(),
        }
    }

    /// Uniform draw from `[min, max]` with occasional long-tail outliers.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, min: u64, max: u64) -> u64 {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let value = rng.gen_range(min..=max);
        if rng.gen_bool(self.jitter.slow_outlier) {
            return rng.gen_range(min..=max.saturating_mul(2));
        }
        if rng.gen_bool(self.jitter.fast_outlier) {
            return rng.gen_range(0..=min);
        }
        value
    }

    pub fn sample_delay<R: Rng + ?Sized>(&self, rng: &mut R, envelope: &JobEnvelope) -> Duration {
        Duration::from_millis(self.sample(rng, envelope.min_ms, envelope.max_ms))
    }

    /// Picks a job's envelope. Plain uniform draws, no outliers.
    pub fn envelope<R: Rng + ?Sized>(&self, rng: &mut R, bounds: &EnvelopeBounds) -> JobEnvelope {
        let max_ms = rng.gen_range(bounds.max_ms.clone());
        let min_ms = rng.gen_range(bounds.min_ms.clone());
        JobEnvelope::new(min_ms, max_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn outlier_rate_is_within_sanity_band() {
        let sampler = DurationSampler::default();
        let mut rng = StdRng::seed_from_u64(0xfeed);
        let trials = 20_000;
        let outside = (0..trials)
            .map(|_| sampler.sample(&mut rng, 100, 200))
            .filter(|value| !(100..=200).contains(value))
            .count();
        let rate = outside as f64 / trials as f64;
        assert!(rate >= 0.01, "outlier rate too low: {rate}");
        assert!(rate <= 0.15, "outlier rate too high: {rate}");
    }

    #[test]
    fn no_jitter_stays_in_range() {
        let sampler = DurationSampler::new(Jitter::none());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..5_000 {
            let value = sampler.sample(&mut rng, 10, 20);
            assert!((10..=20).contains(&value));
        }
    }

    #[test]
    fn degenerate_range_and_zero_bounds() {
        let sampler = DurationSampler::default();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1_000 {
            assert_eq!(sampler.sample(&mut rng, 0, 0), 0);
        }
        let sampler = DurationSampler::new(Jitter::none());
        assert_eq!(sampler.sample(&mut rng, 100, 100), 100);
    }

    #[test]
    fn always_slow_outlier_reaches_double_max() {
        let sampler = DurationSampler::new(Jitter {
            slow_outlier: 1.0,
            fast_outlier: 0.0,
        });
        let mut rng = StdRng::seed_from_u64(3);
        let max_seen = (0..5_000)
            .map(|_| sampler.sample(&mut rng, 10, 20))
            .max()
            .unwrap_or(0);
        assert!(max_seen > 20 && max_seen <= 40);
    }

    #[test]
    fn always_fast_outlier_stays_below_min() {
        let sampler = DurationSampler::new(Jitter {
            slow_outlier: 0.0,
            fast_outlier: 1.0,
        });
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..5_000 {
            assert!(sampler.sample(&mut rng, 10, 20) <= 10);
        }
    }

    #[test]
    fn slow_check_wins() {
        let sampler = DurationSampler::new(Jitter {
            slow_outlier: 1.0,
            fast_outlier: 1.0,
        });
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let value = sampler.sample(&mut rng, 10, 20);
            assert!((10..=40).contains(&value), "got {value}");
        }
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let sampler = DurationSampler::new(Jitter {
            slow_outlier: 2.5,
            fast_outlier: f64::NAN,
        });
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..1_000 {
            let value = sampler.sample(&mut rng, 10, 20);
            assert!((10..=40).contains(&value));
        }
        assert_eq!(
            Jitter {
                slow_outlier: -0.5,
                fast_outlier: 3.0
            }
            .clamped(),
            Jitter {
                slow_outlier: 0.0,
                fast_outlier: 1.0
            }
        );
    }

    #[test]
    fn envelope_respects_bounds() {
        let sampler = DurationSampler::default();
        let bounds = EnvelopeBounds::default();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1_000 {
            let envelope = sampler.envelope(&mut rng, &bounds);
            assert!(bounds.min_ms.contains(&envelope.min_ms));
            assert!(bounds.max_ms.contains(&envelope.max_ms));
            assert!(envelope.min_ms <= envelope.max_ms);
        }
    }
}
