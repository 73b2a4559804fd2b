use crate::core::error::SimError;

/// How a line lands on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Replace the current line in place, leaving the cursor on it.
    Overwrite,
    /// Replace the current line and terminate it.
    Append,
}

/// Destination for rendered lines. Text may carry ANSI escapes.
pub trait LineSink {
    fn write_line(&mut self, line: &str, mode: LineMode) -> Result<(), SimError>;

    fn overwrite(&mut self, line: &str) -> Result<(), SimError> {
        self.write_line(line, LineMode::Overwrite)
    }

    fn append(&mut self, line: &str) -> Result<(), SimError> {
        self.write_line(line, LineMode::Append)
    }
}

/// A block of rows, one per concurrently running job.
pub trait RegionSink: LineSink {
    fn reserve(&mut self, rows: usize) -> Result<(), SimError>;

    fn draw(&mut self, row: usize, line: &str, mode: LineMode) -> Result<(), SimError>;

    /// Leaves the region; later `write_line` calls go below it.
    fn release(&mut self) -> Result<(), SimError>;
}

/// Keeps every line in memory, in write order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub lines: Vec<(LineMode, String)>,
    pub rows: Vec<Vec<(LineMode, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, mode: LineMode) -> usize {
        self.lines.iter().filter(|(m, _)| *m == mode).count()
    }

    pub fn appended(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|(mode, _)| *mode == LineMode::Append)
            .map(|(_, line)| line.as_str())
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(|(_, line)| line.as_str())
    }
}

impl LineSink for RecordingSink {
    fn write_line(&mut self, line: &str, mode: LineMode) -> Result<(), SimError> {
        self.lines.push((mode, line.to_string()));
        Ok(())
    }
}

impl RegionSink for RecordingSink {
    fn reserve(&mut self, rows: usize) -> Result<(), SimError> {
        self.rows = vec![Vec::new(); rows];
        Ok(())
    }

    fn draw(&mut self, row: usize, line: &str, mode: LineMode) -> Result<(), SimError> {
        if let Some(entries) = self.rows.get_mut(row) {
            entries.push((mode, line.to_string()));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}
