use std::time::Duration;

use crate::core::job::JobStatus;

/// Semantic color of a rendered line. Resolved to escapes by `formatter::Palette`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Info,
    Critical,
    Slow,
    Fast,
    Nominal,
}

/// Health limits as percentages of the expected duration.
///
/// All comparisons are strict except the terminal rule, which uses
/// `>=` for the slow limit and `<=` for the fast limit. A projection of
/// exactly 120% is therefore `Slow`, not `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub timeout_pct: u32,
    pub slow_pct: u32,
    pub fast_pct: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            timeout_pct: 120,
            slow_pct: 110,
            fast_pct: 90,
        }
    }
}

impl Thresholds {
    /// Color for a live projection of the total duration.
    pub fn classify(&self, expected: Duration, projected: Duration) -> ColorTag {
        let ratio = Ratio::of(projected, expected);
        if ratio.above(self.timeout_pct) {
            ColorTag::Critical
        } else if ratio.above(self.slow_pct) {
            ColorTag::Slow
        } else if ratio.below(self.fast_pct) {
            ColorTag::Fast
        } else {
            ColorTag::Nominal
        }
    }

    pub fn is_timed_out(&self, expected: Duration, elapsed: Duration) -> bool {
        Ratio::of(elapsed, expected).above(self.timeout_pct)
    }

    /// Final status and color from the actual total elapsed time.
    pub fn settle(&self, expected: Duration, total: Duration) -> (JobStatus, ColorTag) {
        let ratio = Ratio::of(total, expected);
        if ratio.at_least(self.slow_pct) {
            (JobStatus::Warning, ColorTag::Slow)
        } else if ratio.at_most(self.fast_pct) {
            (JobStatus::Success, ColorTag::Fast)
        } else {
            (JobStatus::Success, ColorTag::Nominal)
        }
    }
}

// value / base compared against pct / 100 without floating point.
struct Ratio {
    value: u128,
    base: u128,
}

impl Ratio {
    fn of(value: Duration, base: Duration) -> Self {
        Self {
            value: value.as_nanos() * 100,
            base: base.as_nanos(),
        }
    }

    fn scaled(&self, pct: u32) -> u128 {
        self.base * u128::from(pct)
    }

    fn above(&self, pct: u32) -> bool {
        self.value > self.scaled(pct)
    }

    fn below(&self, pct: u32) -> bool {
        self.value < self.scaled(pct)
    }

    fn at_least(&self, pct: u32) -> bool {
        self.value >= self.scaled(pct)
    }

    fn at_most(&self, pct: u32) -> bool {
        self.value <= self.scaled(pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn badness(tag: ColorTag) -> u8 {
        match tag {
            ColorTag::Fast => 0,
            ColorTag::Nominal => 1,
            ColorTag::Slow => 2,
            ColorTag::Critical => 3,
            ColorTag::Info => unreachable!("classify never yields Info"),
        }
    }

    #[test]
    fn classify_bands() {
        let t = Thresholds::default();
        assert_eq!(t.classify(ms(10_000), ms(13_000)), ColorTag::Critical);
        assert_eq!(t.classify(ms(10_000), ms(11_500)), ColorTag::Slow);
        assert_eq!(t.classify(ms(10_000), ms(10_000)), ColorTag::Nominal);
        assert_eq!(t.classify(ms(10_000), ms(8_000)), ColorTag::Fast);
    }

    #[test]
    fn exact_timeout_boundary_is_slow() {
        let t = Thresholds::default();
        assert_eq!(t.classify(ms(10_000), ms(12_000)), ColorTag::Slow);
        assert_eq!(t.classify(ms(10_000), ms(12_001)), ColorTag::Critical);
        assert!(!t.is_timed_out(ms(10_000), ms(12_000)));
        assert!(t.is_timed_out(ms(10_000), ms(12_001)));
    }

    #[test]
    fn live_slow_and_fast_boundaries_are_nominal() {
        let t = Thresholds::default();
        assert_eq!(t.classify(ms(10_000), ms(11_000)), ColorTag::Nominal);
        assert_eq!(t.classify(ms(10_000), ms(9_000)), ColorTag::Nominal);
    }

    #[test]
    fn classify_is_monotonic_in_projection() {
        let t = Thresholds::default();
        let expected = ms(10_000);
        let mut previous = 0;
        for projected in (0..=20_000).step_by(37) {
            let current = badness(t.classify(expected, ms(projected)));
            assert!(current >= previous, "regressed at {projected}ms");
            previous = current;
        }
    }

    #[test]
    fn settle_uses_inclusive_limits() {
        let t = Thresholds::default();
        assert_eq!(
            t.settle(ms(10_000), ms(11_000)),
            (JobStatus::Warning, ColorTag::Slow)
        );
        assert_eq!(
            t.settle(ms(10_000), ms(10_999)),
            (JobStatus::Success, ColorTag::Nominal)
        );
        assert_eq!(
            t.settle(ms(10_000), ms(9_000)),
            (JobStatus::Success, ColorTag::Fast)
        );
        assert_eq!(
            t.settle(ms(10_000), ms(10_000)),
            (JobStatus::Success, ColorTag::Nominal)
        );
    }
}
