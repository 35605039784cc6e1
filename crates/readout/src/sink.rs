//! Output sinks: streams that accept raw text and can be flushed.
//!
//! Every rendering component writes through an [`OutputSink`]. Two
//! implementations ship with the crate:
//!
//! - [`TermSink`] writes to the process's stdout or stderr via [`console::Term`]
//! - [`BufferSink`] captures output in memory, which is what the tests use
//!
//! [`BufferSink::screen`] replays captured output the way a terminal would
//! (honoring `\r` and `\n`), so tests can assert on what is actually visible.

use console::Term;
use serde::Deserialize;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use crate::width::{probe_terminal, WidthProbe};

/// A stream that accepts raw text and can be flushed.
pub trait OutputSink: Send {
    /// Write text to the stream without adding a newline.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Whether the stream is attached to an interactive terminal.
    fn is_terminal(&self) -> bool;
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn is_terminal(&self) -> bool {
        (**self).is_terminal()
    }
}

/// Which standard channel a [`TermSink`] is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error (the default, so progress never mixes with piped data).
    #[default]
    Stderr,
}

/// Sink bound to the process's stdout or stderr.
#[derive(Debug, Clone)]
pub struct TermSink {
    term: Term,
    stream: Stream,
}

impl TermSink {
    /// Create a sink for the given standard stream.
    pub fn new(stream: Stream) -> Self {
        let term = match stream {
            Stream::Stdout => Term::stdout(),
            Stream::Stderr => Term::stderr(),
        };
        Self { term, stream }
    }

    /// Sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(Stream::Stdout)
    }

    /// Sink writing to standard error.
    pub fn stderr() -> Self {
        Self::new(Stream::Stderr)
    }

    /// The stream this sink is bound to.
    pub fn stream(&self) -> Stream {
        self.stream
    }
}

impl OutputSink for TermSink {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.term.write_str(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.term.flush()
    }

    fn is_terminal(&self) -> bool {
        self.term.is_term()
    }
}

impl WidthProbe for TermSink {
    fn current_width(&self) -> Option<usize> {
        if !self.term.is_term() {
            return None;
        }
        probe_terminal(self.stream)
    }
}

/// In-memory sink.
///
/// Clones share the same buffer, so a test can hand one clone to a console
/// and inspect the output through another.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    buf: Arc<Mutex<String>>,
    terminal: bool,
    width: Option<usize>,
}

impl BufferSink {
    /// Create an empty buffer that reports itself as a non-terminal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that reports itself as a terminal of `width` columns.
    pub fn terminal(width: usize) -> Self {
        Self {
            buf: Arc::default(),
            terminal: true,
            width: Some(width),
        }
    }

    /// Everything written so far, including control characters.
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the buffer, returning what was written.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replay the captured output as a terminal would display it.
    ///
    /// `\r` returns to column zero, `\n` ends the line and backspace moves
    /// one column left. Trailing spaces are trimmed from each line, and a
    /// final unterminated line is included only if something is visible on it.
    pub fn screen(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line: Vec<char> = Vec::new();
        let mut col: usize = 0;

        for ch in self.contents().chars() {
            match ch {
                '\r' => col = 0,
                '\n' => {
                    lines.push(collect_trimmed(&line));
                    line.clear();
                    col = 0;
                }
                '\x08' => col = col.saturating_sub(1),
                c => {
                    if col < line.len() {
                        line[col] = c;
                    } else {
                        line.push(c);
                    }
                    col += 1;
                }
            }
        }

        let last = collect_trimmed(&line);
        if !last.is_empty() {
            lines.push(last);
        }
        lines
    }
}

fn collect_trimmed(line: &[char]) -> String {
    line.iter().collect::<String>().trim_end().to_string()
}

impl OutputSink for BufferSink {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl WidthProbe for BufferSink {
    fn current_width(&self) -> Option<usize> {
        if self.terminal {
            self.width
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_clones_share_contents() {
        let sink = BufferSink::new();
        let mut writer = sink.clone();
        writer.write_str("hello").unwrap();
        assert_eq!(sink.contents(), "hello");
        assert_eq!(sink.take(), "hello");
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn test_screen_carriage_return_overwrites() {
        let mut sink = BufferSink::new();
        sink.write_str("abc\rX").unwrap();
        assert_eq!(sink.screen(), vec!["Xbc"]);
    }

    #[test]
    fn test_screen_newlines_and_erase() {
        let mut sink = BufferSink::new();
        sink.write_str("first\nabc\r   \rdone\n").unwrap();
        assert_eq!(sink.screen(), vec!["first", "done"]);
    }

    #[test]
    fn test_screen_hides_blank_trailing_line() {
        let mut sink = BufferSink::new();
        sink.write_str("line\nabc\r   \r").unwrap();
        assert_eq!(sink.screen(), vec!["line"]);
    }

    #[test]
    fn test_screen_backspace() {
        let mut sink = BufferSink::new();
        sink.write_str("abc\x08\x08Z").unwrap();
        assert_eq!(sink.screen(), vec!["aZc"]);
    }

    #[test]
    fn test_buffer_width_only_when_terminal() {
        assert_eq!(BufferSink::new().current_width(), None);
        assert_eq!(BufferSink::terminal(80).current_width(), Some(80));
        assert!(BufferSink::terminal(80).is_terminal());
        assert!(!BufferSink::new().is_terminal());
    }

    #[test]
    fn test_boxed_sink_delegates() {
        let sink = BufferSink::new();
        let mut boxed: Box<dyn OutputSink> = Box::new(sink.clone());
        boxed.write_str("boxed").unwrap();
        boxed.flush().unwrap();
        assert_eq!(sink.contents(), "boxed");
        assert!(!boxed.is_terminal());
    }
}
