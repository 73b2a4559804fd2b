use std::io;

use clap::Parser;
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use jobpulse::cli::Cli;
use jobpulse::tui;
use jobpulse::util::CrlfWriter;

fn main() {
    // raw mode disables the terminal's own newline translation
    let crlf = io::stderr().is_tty();
    tracing_subscriber::fmt()
        .with_writer(move || CrlfWriter::new(io::stderr(), crlf))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let config = Cli::parse().into_config();
    if let Err(err) = tui::run(config) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
