use std::time::Duration;

use crate::core::job::JobId;

const FILLED: char = '■';
const ARROW: char = '▶';
const TRAILING: char = '·';
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const DONE: char = '√';

/// Renders the fixed-width progress line of a job.
#[derive(Debug, Clone, Copy)]
pub struct ProgressRenderer {
    steps: u32,
    id_width: usize,
}

impl ProgressRenderer {
    pub fn new(steps: u32, id_width: usize) -> Self {
        Self { steps, id_width }
    }

    /// `<id>: [<bar>] [<spinner>] <step>% using <secs>s`
    ///
    /// The bar is always `steps` glyphs wide. Step 0 draws the same bar as
    /// step 1 (a lone arrow) so the line width never changes.
    pub fn render(&self, id: &JobId, step: u32, elapsed: Duration) -> String {
        let step = step.min(self.steps);
        let done = step == self.steps;
        let width = self.steps as usize;

        let mut bar = String::with_capacity(width * 3);
        if done {
            bar.extend(std::iter::repeat(FILLED).take(width));
        } else {
            let filled = step.saturating_sub(1) as usize;
            bar.extend(std::iter::repeat(FILLED).take(filled));
            bar.push(ARROW);
            bar.extend(std::iter::repeat(TRAILING).take(width - filled - 1));
        }

        let spinner = if done {
            DONE
        } else {
            SPINNER[step as usize % SPINNER.len()]
        };

        format!(
            "{}: [{bar}] [{spinner}] {step:>3}% using {}s",
            display_id(id.as_str(), self.id_width),
            elapsed.as_secs()
        )
    }
}

/// Fits an id into `width` columns.
///
/// Ids longer than `width` keep their first `width - 3` chars. Ids that fit
/// lose their first and last char, which unwraps ids that arrive quoted.
/// Either way the result is right-padded to exactly `width`.
pub fn display_id(id: &str, width: usize) -> String {
    let chars: Vec<char> = id.chars().collect();
    let body: String = if chars.len() > width {
        chars[..width.saturating_sub(3)].iter().collect()
    } else if chars.len() >= 2 {
        chars[1..chars.len() - 1].iter().collect()
    } else {
        String::new()
    };
    format!("{body:<width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> ProgressRenderer {
        ProgressRenderer::new(100, 16)
    }

    fn count(line: &str, glyph: char) -> usize {
        line.chars().filter(|c| *c == glyph).count()
    }

    #[test]
    fn full_bar_at_completion() {
        let id = JobId::from("0123456789abcdef0123456789abcdef");
        for secs in [0, 7, 3_600] {
            let line = renderer().render(&id, 100, Duration::from_secs(secs));
            assert_eq!(count(&line, FILLED), 100);
            assert_eq!(count(&line, TRAILING), 0);
            assert_eq!(count(&line, ARROW), 0);
            assert!(line.contains("[√]"));
            assert!(line.ends_with(&format!("100% using {secs}s")));
        }
    }

    #[test]
    fn width_is_constant_across_steps() {
        let id = JobId::from("0123456789abcdef0123456789abcdef");
        let elapsed = Duration::from_millis(4_321);
        let widths: Vec<usize> = (0..=100)
            .map(|step| renderer().render(&id, step, elapsed).chars().count())
            .collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
    }

    #[test]
    fn partial_bar_layout() {
        let id = JobId::from("0123456789abcdef0123456789abcdef");
        let line = renderer().render(&id, 42, Duration::from_millis(1_999));
        assert_eq!(count(&line, FILLED), 41);
        assert_eq!(count(&line, ARROW), 1);
        assert_eq!(count(&line, TRAILING), 58);
        assert!(line.contains("[-]"));
        assert!(line.ends_with(" 42% using 1s"));
    }

    #[test]
    fn spinner_cycles_with_step() {
        let id = JobId::from("job");
        let glyphs: Vec<bool> = (0..4)
            .map(|step| {
                renderer()
                    .render(&id, step, Duration::ZERO)
                    .contains(&format!("[{}]", SPINNER[step as usize]))
            })
            .collect();
        assert_eq!(glyphs, vec![true; 4]);
    }

    #[test]
    fn start_of_job_draws_only_the_arrow() {
        let id = JobId::from("job");
        let line = renderer().render(&id, 0, Duration::ZERO);
        assert!(line.contains("[▶"));
        assert_eq!(count(&line, FILLED), 0);
        assert_eq!(count(&line, TRAILING), 99);
    }

    #[test]
    fn long_ids_are_cut_and_padded() {
        let shown = display_id("0123456789abcdef0123", 16);
        assert_eq!(shown, "0123456789abc   ");
    }

    #[test]
    fn fitting_ids_lose_their_outer_chars() {
        assert_eq!(display_id("\"abc123\"", 16), "abc123          ");
        assert_eq!(display_id("abc123", 16), "bc12            ");
        assert_eq!(display_id("0123456789abcdef", 16), "123456789abcde  ");
    }

    #[test]
    fn tiny_ids_do_not_panic() {
        assert_eq!(display_id("", 16), " ".repeat(16));
        assert_eq!(display_id("x", 16), " ".repeat(16));
    }
}
