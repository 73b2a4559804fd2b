use std::borrow::Cow;
use std::io::{self, Write};

use once_cell::sync::Lazy;
use regex::Regex;

static RE_ANSI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());

/// Removes ANSI escape sequences, borrowing when there are none.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    RE_ANSI.replace_all(text, "")
}

/// Writer that ends lines with `\r\n`, so log output stays aligned while
/// the terminal is in raw mode.
pub struct CrlfWriter<W> {
    inner: W,
    translate: bool,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W, translate: bool) -> Self {
        Self { inner, translate }
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.translate {
            return self.inner.write(buf);
        }
        let mut start = 0;
        for (i, byte) in buf.iter().enumerate() {
            if *byte == b'\n' {
                self.inner.write_all(&buf[start..i])?;
                self.inner.write_all(b"\r\n")?;
                start = i + 1;
            }
        }
        self.inner.write_all(&buf[start..])?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_writer_translates_newlines() {
        let mut writer = CrlfWriter::new(Vec::new(), true);
        writer.write_all(b"one\ntwo\n").unwrap();
        writer.write_all(b"three").unwrap();
        assert_eq!(writer.inner, b"one\r\ntwo\r\nthree");
    }

    #[test]
    fn crlf_writer_passes_through_when_off() {
        let mut writer = CrlfWriter::new(Vec::new(), false);
        writer.write_all(b"one\n").unwrap();
        assert_eq!(writer.inner, b"one\n");
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip_ansi("\u{1b}[91mjob timeout\u{1b}[0m"), "job timeout");
    }

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn strips_cursor_sequences() {
        assert_eq!(strip_ansi("\u{1b}[2Kline\u{1b}[1F"), "line");
    }
}
