use std::time::Duration;

use crate::core::batch::Tally;
use crate::core::classify::ColorTag;
use crate::core::job::JobId;

const RESET: &str = "\u{1b}[0m";

const PALETTE: [(ColorTag, &str); 5] = [
    (ColorTag::Info, "\u{1b}[92m"),
    (ColorTag::Critical, "\u{1b}[91m"),
    (ColorTag::Slow, "\u{1b}[93m"),
    (ColorTag::Fast, "\u{1b}[95m"),
    (ColorTag::Nominal, "\u{1b}[94m"),
];

/// Resolves color tags to ANSI escapes at the rendering boundary.
pub struct Palette;

impl Palette {
    pub fn escape(tag: ColorTag) -> &'static str {
        PALETTE
            .iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|(_, escape)| *escape)
            .unwrap_or(RESET)
    }

    pub fn paint(tag: ColorTag, text: &str) -> String {
        format!("{}{text}{RESET}", Self::escape(tag))
    }
}

pub fn format_header_line(id: &JobId, expected: Duration) -> String {
    format!("Job {id} expect using {}s.", expected.as_secs())
}

pub fn format_running_line(bar: &str, tag: ColorTag, remaining: Duration) -> String {
    Palette::paint(tag, &format!("{bar} still {}s left", remaining.as_secs()))
}

pub fn format_timeout_line(bar: &str) -> String {
    Palette::paint(ColorTag::Critical, &format!("{bar} job timeout"))
}

pub fn format_interrupted_line(bar: &str) -> String {
    Palette::paint(ColorTag::Critical, &format!("{bar} system fatal"))
}

pub fn format_done_line(bar: &str, tag: ColorTag) -> String {
    Palette::paint(tag, bar)
}

pub fn format_summary_line(requested: u32, elapsed: Duration, tally: &Tally) -> String {
    Palette::paint(
        ColorTag::Info,
        &format!(
            "Total {requested} jobs, totally using {}s, {} success, {} warning, {} failure",
            elapsed.as_secs(),
            tally.success,
            tally.warning,
            tally.failure
        ),
    )
}
