use clap::Parser;

use crate::config::SimulationConfig;

#[derive(Debug, Parser)]
#[command(
    name = "jobpulse",
    version,
    about = "Simulates a batch of jobs with live, color-coded progress bars"
)]
pub struct Cli {
    /// Seed for a reproducible batch
    #[arg(long)]
    pub seed: Option<u64>,

    /// Requested job count instead of a random one (runs N-1 jobs)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(2..))]
    pub jobs: Option<u32>,

    /// Run all jobs at once, one row each
    #[arg(long)]
    pub parallel: bool,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Advance a virtual clock instead of sleeping
    #[arg(long)]
    pub virtual_time: bool,
}

impl Cli {
    pub fn into_config(self) -> SimulationConfig {
        SimulationConfig {
            seed: self.seed,
            jobs: self.jobs,
            parallel: self.parallel,
            color: !self.no_color,
            virtual_time: self.virtual_time,
            ..SimulationConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_gives_stock_config() {
        let config = Cli::try_parse_from(["jobpulse"]).unwrap().into_config();
        assert!(config.seed.is_none());
        assert!(config.jobs.is_none());
        assert!(config.color);
        assert!(!config.parallel);
        assert!(!config.virtual_time);
        assert_eq!(config.steps, 100);
    }

    #[test]
    fn flags_map_onto_config() {
        let config = Cli::try_parse_from([
            "jobpulse",
            "--seed",
            "9",
            "--jobs",
            "4",
            "--parallel",
            "--no-color",
            "--virtual-time",
        ])
        .unwrap()
        .into_config();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.jobs, Some(4));
        assert!(config.parallel);
        assert!(!config.color);
        assert!(config.virtual_time);
    }

    #[test]
    fn job_count_below_two_is_rejected() {
        assert!(Cli::try_parse_from(["jobpulse", "--jobs", "1"]).is_err());
    }
}
