//! Log output that cooperates with an active progress line.
//!
//! A plain `fmt` subscriber writing to stderr would print straight over a
//! bar being redrawn there. The subscriber built here writes each formatted
//! event through [`Console::print_above`] instead, so log lines push the
//! progress line down the same way [`Indicator::println`] does.
//!
//! Verbosity follows the usual `-v` counting:
//!
//! | verbosity | default filter | targets shown |
//! |-----------|----------------|---------------|
//! | 0         | `info`         | no            |
//! | 1         | `info`         | yes           |
//! | 2+        | `debug`        | yes           |
//!
//! `RUST_LOG` replaces the default filter when it is set.
//!
//! [`Indicator::println`]: crate::Indicator::println

use std::io;

use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::error::{ProgressError, Result};
use crate::guard::Console;
use crate::sink::OutputSink;

/// Hands out writers that print above the console's active line.
#[derive(Debug, Clone)]
pub struct ConsoleMakeWriter<S> {
    console: Console<S>,
}

impl<S: OutputSink> ConsoleMakeWriter<S> {
    pub fn new(console: Console<S>) -> Self {
        Self { console }
    }
}

impl<'a, S: OutputSink + 'static> MakeWriter<'a> for ConsoleMakeWriter<S> {
    type Writer = ConsoleWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            console: self.console.clone(),
            buf: Vec::new(),
        }
    }
}

/// Collects one formatted event and prints it when dropped.
///
/// Printing the whole event at once keeps it in one piece relative to the
/// progress line's erase and redraw.
pub struct ConsoleWriter<S: OutputSink> {
    console: Console<S>,
    buf: Vec<u8>,
}

impl<S: OutputSink> io::Write for ConsoleWriter<S> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: OutputSink> Drop for ConsoleWriter<S> {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        // Nowhere left to report a failed log write.
        let _ = self.console.print_above(&text);
    }
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 | 1 => "info",
        _ => "debug",
    }
}

/// The filter used for `verbosity` when `RUST_LOG` is not set.
pub fn filter_for(verbosity: u8) -> EnvFilter {
    EnvFilter::new(default_directive(verbosity))
}

/// Build a subscriber writing to `console` with an explicit filter.
pub fn subscriber_with_filter<S>(
    console: Console<S>,
    verbosity: u8,
    filter: EnvFilter,
) -> impl Subscriber + Send + Sync
where
    S: OutputSink + 'static,
{
    let ansi = console.lock().sink().is_terminal();
    let layer = fmt::layer()
        .with_writer(ConsoleMakeWriter::new(console))
        .with_ansi(ansi)
        .with_target(verbosity > 0)
        .without_time();
    tracing_subscriber::registry().with(filter).with(layer)
}

/// Build a subscriber writing to `console`, filtered by `RUST_LOG` or by
/// `verbosity`.
pub fn subscriber<S>(console: Console<S>, verbosity: u8) -> impl Subscriber + Send + Sync
where
    S: OutputSink + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(verbosity));
    subscriber_with_filter(console, verbosity, filter)
}

/// Install the console subscriber as the global default.
///
/// # Errors
///
/// Returns [`ProgressError::Logging`] if a global subscriber is already set.
pub fn init<S>(console: Console<S>, verbosity: u8) -> Result<()>
where
    S: OutputSink + 'static,
{
    tracing::subscriber::set_global_default(subscriber(console, verbosity))
        .map_err(|err| ProgressError::Logging(err.to_string()))?;
    tracing::debug!(verbosity, "logging initialized");
    Ok(())
}
