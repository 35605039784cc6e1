//! Terminal width detection.
//!
//! A [`WidthProbe`] answers "how many columns does the attached terminal
//! have right now?". The answer is `None` whenever the stream is not an
//! interactive terminal (redirected to a file or a pipe); callers treat that
//! as "no width constraint", never as an error.

use std::io;

use crate::sink::Stream;

/// Queries the current column count of a terminal.
pub trait WidthProbe {
    /// Current width in columns, or `None` if unknown.
    fn current_width(&self) -> Option<usize>;
}

/// A probe that always answers with the same value.
///
/// Useful for tests and for callers that want to pin a width regardless of
/// the attached terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedWidth(pub Option<usize>);

impl WidthProbe for FixedWidth {
    fn current_width(&self) -> Option<usize> {
        self.0
    }
}

/// Gets the width of the terminal behind the given stream, if any.
pub(crate) fn probe_terminal(stream: Stream) -> Option<usize> {
    let size = match stream {
        Stream::Stdout => terminal_size::terminal_size_of(io::stdout()),
        Stream::Stderr => terminal_size::terminal_size_of(io::stderr()),
    };
    size.map(|(w, _)| w.0 as usize)
}
