use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveToNextLine, MoveToPreviousLine, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::tty::IsTty;
use crossterm::{queue, ExecutableCommand};

use crate::config::SimulationConfig;
use crate::core::{
    self, BatchResult, BatchRunner, Interrupter, LineMode, LineSink, ManualClock, RegionSink,
    SimError, SystemClock,
};
use crate::util::strip_ansi;

/// Raw mode for the lifetime of the batch, so Ctrl-C arrives as a key.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, SimError> {
        enable_raw_mode().map_err(|e| SimError::Terminal {
            message: e.to_string(),
        })?;
        let mut stdout = io::stdout();
        stdout.execute(Hide).map_err(|e| SimError::Terminal {
            message: e.to_string(),
        })?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.execute(Show);
        let _ = disable_raw_mode();
    }
}

/// Polls keys on a background thread until dropped.
///
/// Ctrl-C interrupts the sleeping job(s); Esc or `q` aborts the batch.
struct KeyWatcher {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl KeyWatcher {
    fn spawn(interrupter: Arc<Interrupter>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match event::poll(Duration::from_millis(50)) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let key = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                    Ok(_) => continue,
                    Err(_) => break,
                };
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        tracing::info!("Interrupt requested");
                        interrupter.interrupt();
                    }
                    KeyCode::Esc | KeyCode::Char('q') => {
                        tracing::info!("Abort requested");
                        interrupter.abort();
                    }
                    _ => {}
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for KeyWatcher {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Line sink over a writer.
///
/// Interactive sinks redraw in place with a carriage return and a line
/// clear. Non-interactive sinks drop redraws and print committed lines.
pub struct TerminalSink<W: Write> {
    out: W,
    interactive: bool,
    color: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, interactive: bool, color: bool) -> Self {
        Self {
            out,
            interactive,
            color,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn text<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.color {
            Cow::Borrowed(line)
        } else {
            strip_ansi(line)
        }
    }
}

impl<W: Write> LineSink for TerminalSink<W> {
    fn write_line(&mut self, line: &str, mode: LineMode) -> Result<(), SimError> {
        let text = self.text(line);
        if self.interactive {
            queue!(self.out, Print('\r'), Clear(ClearType::CurrentLine), Print(&text))?;
            if mode == LineMode::Append {
                queue!(self.out, Print("\r\n"))?;
            }
        } else if mode == LineMode::Append {
            writeln!(self.out, "{text}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// One terminal row per job, redrawn with relative cursor moves.
pub struct TerminalRegion<W: Write> {
    sink: TerminalSink<W>,
    rows: usize,
}

impl<W: Write> TerminalRegion<W> {
    pub fn new(sink: TerminalSink<W>) -> Self {
        Self { sink, rows: 0 }
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write> LineSink for TerminalRegion<W> {
    fn write_line(&mut self, line: &str, mode: LineMode) -> Result<(), SimError> {
        self.sink.write_line(line, mode)
    }
}

impl<W: Write> RegionSink for TerminalRegion<W> {
    fn reserve(&mut self, rows: usize) -> Result<(), SimError> {
        self.rows = rows;
        if self.sink.interactive {
            for _ in 0..rows {
                queue!(self.sink.out, Print("\r\n"))?;
            }
            self.sink.out.flush()?;
        }
        Ok(())
    }

    fn draw(&mut self, row: usize, line: &str, mode: LineMode) -> Result<(), SimError> {
        if row >= self.rows {
            return Ok(());
        }
        if !self.sink.interactive {
            return self.sink.write_line(line, mode);
        }
        let up = u16::try_from(self.rows - row).unwrap_or(u16::MAX);
        let text = self.sink.text(line).into_owned();
        queue!(
            self.sink.out,
            MoveToPreviousLine(up),
            Clear(ClearType::CurrentLine),
            Print(text),
            MoveToNextLine(up)
        )?;
        self.sink.out.flush()?;
        Ok(())
    }

    fn release(&mut self) -> Result<(), SimError> {
        self.rows = 0;
        Ok(())
    }
}

/// Runs one batch against the process terminal.
pub fn run(config: SimulationConfig) -> Result<BatchResult, SimError> {
    let interactive = io::stdout().is_tty();
    let color = config.color && interactive;
    let interrupter = Interrupter::new();
    let runner = BatchRunner::new(config.clone())?.abort_on(Arc::clone(&interrupter));
    let mut rng = core::batch_rng(&config);

    let guard = if interactive && !config.virtual_time {
        Some(TerminalGuard::enter()?)
    } else {
        None
    };
    let _watcher = guard
        .as_ref()
        .map(|_| KeyWatcher::spawn(Arc::clone(&interrupter)));

    let mut sink = TerminalSink::new(io::stdout(), interactive, color);
    match (config.parallel, config.virtual_time) {
        (false, false) => {
            let mut clock = SystemClock::new(Arc::clone(&interrupter));
            runner.run(&mut rng, &mut clock, &mut sink)
        }
        (false, true) => runner.run(&mut rng, &mut ManualClock::new(), &mut sink),
        (true, false) => {
            let mut region = TerminalRegion::new(sink);
            runner.run_parallel(
                &mut rng,
                || SystemClock::new(Arc::clone(&interrupter)),
                &mut region,
            )
        }
        (true, true) => {
            let mut region = TerminalRegion::new(sink);
            runner.run_parallel(&mut rng, ManualClock::new, &mut region)
        }
    }
}
