//! Live progress indicators: bar, dots and mill.
//!
//! All three styles share one [`Indicator`] type that owns the lifecycle
//! (construction, `every` throttling, ETA, close) and delegates frame
//! rendering to a [`Strategy`]:
//!
//! | Strategy | Output |
//! |----------|--------|
//! | [`Bar`]  | `label[###    ] 3/10 05s`, redrawn in place |
//! | [`Dots`] | `label....`, append-only |
//! | [`Mill`] | `label / 3/10`, redrawn in place |
//!
//! ## Lifecycle
//!
//! An indicator is **idle** until it can render, **rendering** while it is
//! advanced, and **closed** once [`Indicator::close`] consumes it. A bar
//! whose total is known at construction takes the console line and shows
//! 0% immediately. Dropping an open indicator closes it, so breaking out
//! of a wrapped loop still leaves a clean terminal.
//!
//! ## Example
//!
//! ```rust
//! use readout::{BufferSink, Console, ProgressBuilder};
//!
//! let sink = BufferSink::new();
//! let console = Console::new(sink.clone());
//!
//! let mut bar = ProgressBuilder::new()
//!     .width(4)
//!     .expected_size(4)
//!     .bar(&console)
//!     .unwrap();
//! bar.advance(1).unwrap();
//! bar.advance(3).unwrap();
//! bar.close().unwrap();
//!
//! assert_eq!(sink.screen(), vec!["[####] 4/4"]);
//! ```
//!
//! ## Wrapping an iterator
//!
//! ```rust
//! use readout::{BufferSink, Console, ProgressBuilder};
//!
//! let sink = BufferSink::new();
//! let console = Console::new(sink.clone());
//!
//! let items = vec!["a", "b", "c"];
//! let mut seen = Vec::new();
//! for item in ProgressBuilder::new().label("Files ").wrap_bar(&console, &items).unwrap() {
//!     seen.push(*item);
//! }
//!
//! assert_eq!(seen, items);
//! assert!(sink.screen()[0].ends_with("3/3"));
//! ```

mod iter;
mod strategy;

pub use iter::{ProgressIter, ProgressIterExt};
pub use strategy::{
    Bar, Dots, Frame, FrameContext, Mill, Strategy, BAR_EMPTY_CHAR, BAR_FILLED_CHAR, DOTS_CHAR,
    MILL_CHARS,
};

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{ProgressError, Result};
use crate::eta::EtaEstimator;
use crate::format::{format_eta, SizeFormat};
use crate::guard::{Console, LineEnd, LineHandle};
use crate::sink::OutputSink;

/// Default width of the bar segment, in characters.
pub const DEFAULT_WIDTH: usize = 32;

/// Counters and settings of one indicator.
///
/// The length of the last rendered line is tracked by the console's
/// [`RenderGuard`](crate::RenderGuard), which is what erases it.
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Prefix text, may be empty.
    pub label: String,
    /// Expected item count, `None` until supplied.
    pub total: Option<u64>,
    /// Items completed so far. Never exceeds `total`.
    pub processed: u64,
    /// Width of the bar segment.
    pub width: usize,
    /// When the indicator was created.
    pub started_at: Instant,
    /// When set, nothing is written but counting still happens.
    pub hidden: bool,
    /// Render only when `processed % every == 0`, or on the final item.
    pub every: u64,
}

impl ProgressState {
    /// Whether every expected item has been processed.
    pub fn is_complete(&self) -> bool {
        self.total == Some(self.processed)
    }

    /// Whether the throttle lets the current count render.
    pub fn should_render(&self) -> bool {
        self.processed % self.every == 0 || self.is_complete()
    }
}

/// Builder for indicators.
///
/// ```rust
/// use readout::{BufferSink, Console, ProgressBuilder};
///
/// let console = Console::new(BufferSink::new());
/// let mill = ProgressBuilder::new()
///     .label("Indexing")
///     .expected_size(100)
///     .every(10)
///     .mill(&console)
///     .unwrap();
/// assert_eq!(mill.total(), Some(100));
/// ```
#[derive(Clone)]
pub struct ProgressBuilder {
    label: String,
    width: usize,
    hide: bool,
    empty_char: char,
    filled_char: char,
    edge_char: Option<char>,
    dot_char: char,
    expected_size: Option<u64>,
    every: u64,
    show_percent: bool,
    sizes: SizeFormat,
    clear_on_close: bool,
    clock: Option<Arc<dyn Clock>>,
}

impl Default for ProgressBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProgressBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBuilder")
            .field("label", &self.label)
            .field("width", &self.width)
            .field("hide", &self.hide)
            .field("expected_size", &self.expected_size)
            .field("every", &self.every)
            .finish_non_exhaustive()
    }
}

impl ProgressBuilder {
    /// A builder with the default glyphs, width 32 and no throttle.
    pub fn new() -> Self {
        Self {
            label: String::new(),
            width: DEFAULT_WIDTH,
            hide: false,
            empty_char: BAR_EMPTY_CHAR,
            filled_char: BAR_FILLED_CHAR,
            edge_char: None,
            dot_char: DOTS_CHAR,
            expected_size: None,
            every: 1,
            show_percent: false,
            sizes: SizeFormat::Count,
            clear_on_close: false,
            clock: None,
        }
    }

    /// Prefix text. Written as-is, so include any trailing space you want.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Width of the bar segment.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Count without writing anything.
    pub fn hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    /// Glyph for unfilled bar cells.
    pub fn empty_char(mut self, c: char) -> Self {
        self.empty_char = c;
        self
    }

    /// Glyph for filled bar cells.
    pub fn filled_char(mut self, c: char) -> Self {
        self.filled_char = c;
        self
    }

    /// Glyph for the leading edge of the bar.
    pub fn edge_char(mut self, c: char) -> Self {
        self.edge_char = Some(c);
        self
    }

    /// Glyph appended by the dots indicator.
    pub fn dot_char(mut self, c: char) -> Self {
        self.dot_char = c;
        self
    }

    /// Number of items expected.
    pub fn expected_size(mut self, total: u64) -> Self {
        self.expected_size = Some(total);
        self
    }

    /// Render only every `n` items (and always on the last one).
    pub fn every(mut self, n: u64) -> Self {
        self.every = n;
        self
    }

    /// Show a percentage after the bar.
    pub fn show_percent(mut self, show: bool) -> Self {
        self.show_percent = show;
        self
    }

    /// How counts are displayed.
    pub fn sizes(mut self, sizes: SizeFormat) -> Self {
        self.sizes = sizes;
        self
    }

    /// Erase the line on close instead of leaving the final frame visible.
    pub fn clear_on_close(mut self, clear: bool) -> Self {
        self.clear_on_close = clear;
        self
    }

    /// Time source for the ETA. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// The bar strategy configured by this builder.
    pub fn bar_strategy(&self) -> Bar {
        Bar {
            filled_char: self.filled_char,
            empty_char: self.empty_char,
            edge_char: self.edge_char,
            show_percent: self.show_percent,
        }
    }

    /// The dots strategy configured by this builder.
    pub fn dots_strategy(&self) -> Dots {
        Dots {
            glyph: self.dot_char,
        }
    }

    /// Build a bar indicator.
    pub fn bar<S: OutputSink>(self, console: &Console<S>) -> Result<Indicator<S, Bar>> {
        let strategy = self.bar_strategy();
        self.build(console, strategy)
    }

    /// Build a dots indicator.
    pub fn dots<S: OutputSink>(self, console: &Console<S>) -> Result<Indicator<S, Dots>> {
        let strategy = self.dots_strategy();
        self.build(console, strategy)
    }

    /// Build a mill indicator.
    pub fn mill<S: OutputSink>(self, console: &Console<S>) -> Result<Indicator<S, Mill>> {
        self.build(console, Mill::default())
    }

    /// Build an indicator with any strategy.
    ///
    /// If the total is already known (or the strategy does not need it) and
    /// the indicator is not hidden, it takes the console line and renders its
    /// first frame before returning.
    pub fn build<S, R>(self, console: &Console<S>, strategy: R) -> Result<Indicator<S, R>>
    where
        S: OutputSink,
        R: Strategy,
    {
        if self.every == 0 {
            return Err(ProgressError::ZeroEvery);
        }
        if self.expected_size == Some(0) {
            return Err(ProgressError::ZeroTotal);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let started_at = clock.now();
        let line_end = if self.clear_on_close {
            LineEnd::Clear
        } else {
            LineEnd::Newline
        };

        let mut indicator = Indicator {
            console: console.clone(),
            strategy,
            state: ProgressState {
                label: self.label,
                total: self.expected_size,
                processed: 0,
                width: self.width,
                started_at,
                hidden: self.hide,
                every: self.every,
            },
            eta: EtaEstimator::new(started_at),
            clock,
            sizes: self.sizes,
            line_end,
            line: None,
            rendered: None,
            closed: false,
        };
        indicator.ensure_open()?;
        Ok(indicator)
    }

    /// Wrap an iterable so each consumed element advances a bar.
    ///
    /// The total is the configured expected size, or the iterator's exact
    /// length. An empty iterable yields nothing and draws nothing, but an
    /// explicit expected size of zero is rejected like in [`bar`](Self::bar).
    pub fn wrap_bar<I, S>(
        self,
        console: &Console<S>,
        iterable: I,
    ) -> Result<ProgressIter<I::IntoIter, S, Bar>>
    where
        I: IntoIterator,
        S: OutputSink,
    {
        let strategy = self.bar_strategy();
        self.wrap(console, iterable, strategy)
    }

    /// Wrap an iterable with a dots indicator.
    pub fn wrap_dots<I, S>(
        self,
        console: &Console<S>,
        iterable: I,
    ) -> Result<ProgressIter<I::IntoIter, S, Dots>>
    where
        I: IntoIterator,
        S: OutputSink,
    {
        let strategy = self.dots_strategy();
        self.wrap(console, iterable, strategy)
    }

    /// Wrap an iterable with a mill indicator.
    pub fn wrap_mill<I, S>(
        self,
        console: &Console<S>,
        iterable: I,
    ) -> Result<ProgressIter<I::IntoIter, S, Mill>>
    where
        I: IntoIterator,
        S: OutputSink,
    {
        self.wrap(console, iterable, Mill::default())
    }

    /// Wrap an iterable with any strategy.
    pub fn wrap<I, S, R>(
        self,
        console: &Console<S>,
        iterable: I,
        strategy: R,
    ) -> Result<ProgressIter<I::IntoIter, S, R>>
    where
        I: IntoIterator,
        S: OutputSink,
        R: Strategy,
    {
        if self.expected_size == Some(0) {
            return Err(ProgressError::ZeroTotal);
        }
        let iter = iterable.into_iter();
        let total = self.expected_size.or_else(|| exact_len(&iter));
        match total {
            Some(0) => Ok(ProgressIter::idle(iter, console.clone(), self.hide)),
            Some(total) => {
                let indicator = self.expected_size(total).build(console, strategy)?;
                Ok(ProgressIter::new(iter, indicator))
            }
            None if strategy.needs_total() => Err(ProgressError::UnknownTotal),
            None => {
                let indicator = self.build(console, strategy)?;
                Ok(ProgressIter::new(iter, indicator))
            }
        }
    }
}

fn exact_len<I: Iterator>(iter: &I) -> Option<u64> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(lower as u64),
        _ => None,
    }
}

/// One live progress-rendering session.
pub struct Indicator<S: OutputSink, R: Strategy> {
    console: Console<S>,
    strategy: R,
    state: ProgressState,
    eta: EtaEstimator,
    clock: Arc<dyn Clock>,
    sizes: SizeFormat,
    line_end: LineEnd,
    line: Option<LineHandle>,
    /// `processed` as of the last frame written.
    rendered: Option<u64>,
    closed: bool,
}

impl<S: OutputSink, R: Strategy> Indicator<S, R> {
    /// Record one completed item.
    pub fn tick(&mut self) -> Result<()> {
        self.advance(1)
    }

    /// Record `n` completed items and render if the throttle admits it.
    ///
    /// Fails without changing any state if the advance would pass the total,
    /// or if the indicator must render but its total is still unknown.
    pub fn advance(&mut self, n: u64) -> Result<()> {
        let processed = self.state.processed.saturating_add(n);
        if let Some(total) = self.state.total {
            if processed > total {
                return Err(ProgressError::PastTotal { processed, total });
            }
        }
        if self.state.total.is_none() && self.strategy.needs_total() && !self.state.hidden {
            return Err(ProgressError::UnknownTotal);
        }

        self.state.processed = processed;
        if let Some(total) = self.state.total {
            self.eta.observe(processed, total, self.clock.now());
        }

        if self.state.hidden || self.closed || !self.state.should_render() {
            return Ok(());
        }
        self.ensure_open()?;

        let eta = self.eta_display();
        let ctx = FrameContext {
            eta: &eta,
            sizes: self.sizes,
        };
        let frame = self.strategy.tick(&self.state, &ctx)?;
        self.emit(frame)?;
        self.rendered = Some(self.state.processed);
        Ok(())
    }

    /// Supply the total of an indicator created without one.
    ///
    /// An idle indicator takes the console line and renders immediately.
    pub fn set_total(&mut self, total: u64) -> Result<()> {
        if let Some(existing) = self.state.total {
            return Err(ProgressError::TotalAlreadySet(existing));
        }
        if total == 0 {
            return Err(ProgressError::ZeroTotal);
        }
        if self.state.processed > total {
            return Err(ProgressError::PastTotal {
                processed: self.state.processed,
                total,
            });
        }
        self.state.total = Some(total);
        self.ensure_open()
    }

    /// Run `write` with the line erased, then redraw it.
    ///
    /// Without an active line (hidden or idle) `write` runs directly.
    /// `write` must not call back into the console.
    pub fn interleave<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut S) -> io::Result<()>,
    {
        let mut guard = self.console.lock();
        match &self.line {
            Some(handle) => guard.interleave(handle, write),
            None => {
                write(guard.sink_mut())?;
                Ok(())
            }
        }
    }

    /// Print a message line above the indicator.
    pub fn println(&self, message: &str) -> Result<()> {
        self.console.println(message)?;
        Ok(())
    }

    /// Render a final frame if needed and release the line.
    ///
    /// Write failures caused by the reader going away are ignored here.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    /// Close, then print `message` on its own line (unless hidden).
    pub fn close_with_message(mut self, message: &str) -> Result<()> {
        self.shutdown()?;
        if !self.state.hidden {
            suppress_broken_pipe(self.console.println(message).map_err(Into::into))?;
        }
        Ok(())
    }

    /// Items completed so far.
    pub fn processed(&self) -> u64 {
        self.state.processed
    }

    /// Expected item count, if known.
    pub fn total(&self) -> Option<u64> {
        self.state.total
    }

    /// The indicator's counters and settings.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// The smoothed time remaining, if one has been computed.
    pub fn eta(&self) -> Option<Duration> {
        self.eta.estimate_remaining()
    }

    /// Whether the indicator currently owns the console line.
    pub fn is_rendering(&self) -> bool {
        self.line.is_some()
    }

    /// The console this indicator draws on.
    pub fn console(&self) -> &Console<S> {
        &self.console
    }

    fn eta_display(&self) -> String {
        if self.state.processed == 0 {
            return String::new();
        }
        self.eta
            .estimate_remaining()
            .map(format_eta)
            .unwrap_or_default()
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.closed || self.state.hidden || self.line.is_some() {
            return Ok(());
        }
        if self.strategy.needs_total() && self.state.total.is_none() {
            return Ok(());
        }

        self.line = Some(self.console.lock().begin()?);
        debug!(label = %self.state.label, total = ?self.state.total, "progress line opened");

        let eta = self.eta_display();
        let ctx = FrameContext {
            eta: &eta,
            sizes: self.sizes,
        };
        let frame = self.strategy.open(&self.state, &ctx)?;
        self.emit(frame)?;
        self.rendered = Some(self.state.processed);
        Ok(())
    }

    fn emit(&self, frame: Frame) -> Result<()> {
        match &self.line {
            Some(handle) => write_frame(&self.console, handle, frame),
            None => Ok(()),
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let Some(handle) = self.line.take() else {
            return Ok(());
        };

        let rendered = self.final_frame(&handle);
        let ended = self.console.lock().end(handle, self.line_end);
        debug!(
            label = %self.state.label,
            processed = self.state.processed,
            total = ?self.state.total,
            "progress line closed"
        );
        suppress_broken_pipe(rendered.and(ended))
    }

    fn final_frame(&mut self, handle: &LineHandle) -> Result<()> {
        if self.rendered == Some(self.state.processed) {
            return Ok(());
        }
        let eta = self.eta_display();
        let ctx = FrameContext {
            eta: &eta,
            sizes: self.sizes,
        };
        let frame = self.strategy.finish(&self.state, &ctx)?;
        write_frame(&self.console, handle, frame)?;
        self.rendered = Some(self.state.processed);
        Ok(())
    }
}

impl<S: OutputSink, R: Strategy> Drop for Indicator<S, R> {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl<S: OutputSink, R: Strategy + std::fmt::Debug> std::fmt::Debug for Indicator<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indicator")
            .field("strategy", &self.strategy)
            .field("state", &self.state)
            .field("rendering", &self.line.is_some())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn write_frame<S: OutputSink>(console: &Console<S>, handle: &LineHandle, frame: Frame) -> Result<()> {
    let mut guard = console.lock();
    match frame {
        Frame::Redraw(text) => guard.draw(handle, &text),
        Frame::Append(text) => guard.append(handle, &text),
        Frame::Nothing => Ok(()),
    }
}

fn suppress_broken_pipe(result: Result<()>) -> Result<()> {
    match result {
        Err(err) if err.is_broken_pipe() => {
            debug!("output stream closed while finishing progress line");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::BufferSink;

    fn console() -> (Console<BufferSink>, BufferSink) {
        let sink = BufferSink::new();
        (Console::new(sink.clone()), sink)
    }

    /// Frames written to the sink, in order, with erase sequences removed.
    fn frames(sink: &BufferSink) -> Vec<String> {
        sink.contents()
            .split(['\r', '\n'])
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_bar_renders_eagerly() {
        let (console, sink) = console();
        let bar = ProgressBuilder::new()
            .width(4)
            .expected_size(4)
            .bar(&console)
            .unwrap();
        assert!(bar.is_rendering());
        assert_eq!(sink.screen(), vec!["[    ] 0/4"]);
    }

    #[test]
    fn test_bar_example_sequence() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new()
            .width(4)
            .expected_size(4)
            .bar(&console)
            .unwrap();

        bar.advance(1).unwrap();
        assert_eq!(sink.screen(), vec!["[#   ] 1/4"]);

        bar.advance(3).unwrap();
        assert_eq!(sink.screen(), vec!["[####] 4/4"]);

        bar.close().unwrap();
        assert_eq!(sink.screen(), vec!["[####] 4/4"]);
        assert!(sink.contents().ends_with("4/4\n"));
        assert!(!console.is_active());
    }

    #[test]
    fn test_zero_total_rejected() {
        let (console, _) = console();
        let err = ProgressBuilder::new()
            .expected_size(0)
            .bar(&console)
            .unwrap_err();
        assert!(matches!(err, ProgressError::ZeroTotal));
        assert!(!console.is_active());
    }

    #[test]
    fn test_wrap_rejects_explicit_zero_total() {
        let (console, sink) = console();
        let err = ProgressBuilder::new()
            .expected_size(0)
            .wrap_bar(&console, 0..3)
            .err();
        assert!(matches!(err, Some(ProgressError::ZeroTotal)));

        // an inferred zero length stays idle instead
        let mut it = ProgressBuilder::new().wrap_bar(&console, 0..0).unwrap();
        assert_eq!(it.next(), None);
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn test_zero_every_rejected() {
        let (console, _) = console();
        let err = ProgressBuilder::new().every(0).dots(&console).unwrap_err();
        assert!(matches!(err, ProgressError::ZeroEvery));
    }

    #[test]
    fn test_advance_past_total_fails_fast() {
        let (console, _) = console();
        let mut bar = ProgressBuilder::new()
            .expected_size(2)
            .bar(&console)
            .unwrap();
        bar.advance(2).unwrap();
        let err = bar.advance(1).unwrap_err();
        assert!(matches!(
            err,
            ProgressError::PastTotal {
                processed: 3,
                total: 2
            }
        ));
        assert_eq!(bar.processed(), 2);
    }

    #[test]
    fn test_bar_without_total_is_idle() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new().width(2).bar(&console).unwrap();
        assert!(!bar.is_rendering());
        assert!(!console.is_active());
        assert!(matches!(bar.advance(1), Err(ProgressError::UnknownTotal)));
        assert_eq!(bar.processed(), 0);

        bar.set_total(2).unwrap();
        assert!(bar.is_rendering());
        assert_eq!(sink.screen(), vec!["[  ] 0/2"]);
        assert!(matches!(
            bar.set_total(3),
            Err(ProgressError::TotalAlreadySet(2))
        ));
    }

    #[test]
    fn test_set_total_validates() {
        let (console, _) = console();
        let mut dots = ProgressBuilder::new().dots(&console).unwrap();
        dots.advance(5).unwrap();
        assert!(matches!(dots.set_total(0), Err(ProgressError::ZeroTotal)));
        assert!(matches!(
            dots.set_total(3),
            Err(ProgressError::PastTotal {
                processed: 5,
                total: 3
            })
        ));
        dots.set_total(10).unwrap();
        assert_eq!(dots.total(), Some(10));
    }

    #[test]
    fn test_every_throttles_but_final_always_renders() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new()
            .width(10)
            .expected_size(10)
            .every(3)
            .bar(&console)
            .unwrap();
        for _ in 0..10 {
            bar.tick().unwrap();
        }
        bar.close().unwrap();

        let counts: Vec<String> = frames(&sink)
            .iter()
            .map(|f| f.rsplit(' ').next().unwrap().to_string())
            .collect();
        assert_eq!(counts, vec!["0/10", "3/10", "6/10", "9/10", "10/10"]);
    }

    #[test]
    fn test_close_renders_unrendered_progress() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new()
            .width(4)
            .expected_size(8)
            .every(4)
            .bar(&console)
            .unwrap();
        bar.advance(3).unwrap();
        bar.close().unwrap();
        assert_eq!(sink.screen(), vec!["[#   ] 3/8"]);
    }

    #[test]
    fn test_hidden_counts_silently() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new()
            .hide(true)
            .expected_size(3)
            .bar(&console)
            .unwrap();
        bar.advance(3).unwrap();
        assert_eq!(bar.processed(), 3);
        assert!(!console.is_active());
        bar.close_with_message("done").unwrap();
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn test_second_indicator_on_same_console_fails() {
        let (console, _) = console();
        let _first = ProgressBuilder::new()
            .expected_size(3)
            .bar(&console)
            .unwrap();
        let err = ProgressBuilder::new()
            .expected_size(3)
            .mill(&console)
            .unwrap_err();
        assert!(matches!(err, ProgressError::LineBusy));
    }

    #[test]
    fn test_drop_closes_line() {
        let (console, sink) = console();
        {
            let mut bar = ProgressBuilder::new()
                .width(2)
                .expected_size(2)
                .bar(&console)
                .unwrap();
            bar.tick().unwrap();
        }
        assert!(!console.is_active());
        assert!(sink.contents().ends_with("1/2\n"));
    }

    #[test]
    fn test_dots_append_only() {
        let (console, sink) = console();
        let mut dots = ProgressBuilder::new()
            .label("Loading ")
            .expected_size(4)
            .every(2)
            .dots(&console)
            .unwrap();
        for _ in 0..4 {
            dots.tick().unwrap();
        }
        dots.close().unwrap();
        assert_eq!(sink.contents(), "Loading ..\n");
    }

    #[test]
    fn test_mill_in_place() {
        let (console, sink) = console();
        let mut mill = ProgressBuilder::new()
            .label("work")
            .expected_size(3)
            .mill(&console)
            .unwrap();
        for _ in 0..3 {
            mill.tick().unwrap();
        }
        mill.close().unwrap();
        assert_eq!(sink.screen(), vec!["work \\ 3/3"]);
        assert_eq!(
            frames(&sink),
            vec!["work | 0/3", "work / 1/3", "work - 2/3", "work \\ 3/3"]
        );
    }

    #[test]
    fn test_eta_shown_after_interval() {
        let (console, sink) = console();
        let clock = ManualClock::new();
        let mut bar = ProgressBuilder::new()
            .width(4)
            .expected_size(4)
            .clock(clock.clone())
            .bar(&console)
            .unwrap();

        clock.advance(Duration::from_secs(2));
        bar.tick().unwrap();
        assert_eq!(sink.screen(), vec!["[#   ] 1/4 03s"]);
        assert_eq!(bar.eta(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_huge_total_saturates_eta() {
        let (console, sink) = console();
        let clock = ManualClock::new();
        let mut bar = ProgressBuilder::new()
            .width(4)
            .expected_size(u64::MAX)
            .clock(clock.clone())
            .bar(&console)
            .unwrap();

        clock.advance(Duration::from_secs(2));
        bar.advance(1).unwrap();
        assert_eq!(bar.eta(), Some(Duration::MAX));
        assert!(sink.screen()[0].starts_with("[    ] 1/18446744073709551615 "));
    }

    #[test]
    fn test_eta_hidden_before_interval() {
        let (console, sink) = console();
        let clock = ManualClock::new();
        let mut bar = ProgressBuilder::new()
            .width(4)
            .expected_size(4)
            .clock(clock.clone())
            .bar(&console)
            .unwrap();

        clock.advance(Duration::from_millis(300));
        bar.tick().unwrap();
        assert_eq!(sink.screen(), vec!["[#   ] 1/4"]);
        assert_eq!(bar.eta(), None);
    }

    #[test]
    fn test_clear_on_close() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new()
            .expected_size(1)
            .clear_on_close(true)
            .bar(&console)
            .unwrap();
        bar.tick().unwrap();
        bar.close_with_message("finished").unwrap();
        assert_eq!(sink.screen(), vec!["finished"]);
    }

    #[test]
    fn test_interleave_keeps_bar_below_output() {
        let (console, sink) = console();
        let mut bar = ProgressBuilder::new()
            .width(4)
            .expected_size(4)
            .bar(&console)
            .unwrap();
        bar.advance(2).unwrap();
        bar.interleave(|s| s.write_str("copied a.txt\n")).unwrap();
        bar.println("copied b.txt").unwrap();
        assert_eq!(
            sink.screen(),
            vec!["copied a.txt", "copied b.txt", "[##  ] 2/4"]
        );
    }

    #[test]
    fn test_interleave_without_line_writes_directly() {
        let (console, sink) = console();
        let bar = ProgressBuilder::new()
            .hide(true)
            .expected_size(4)
            .bar(&console)
            .unwrap();
        bar.interleave(|s| s.write_str("plain\n")).unwrap();
        assert_eq!(sink.contents(), "plain\n");
    }

    #[test]
    fn test_boxed_strategy_indicator() {
        let (console, sink) = console();
        let strategy: Box<dyn Strategy> = Box::new(Mill::default());
        let mut ind = ProgressBuilder::new()
            .label("x")
            .expected_size(1)
            .build(&console, strategy)
            .unwrap();
        ind.tick().unwrap();
        ind.close().unwrap();
        assert_eq!(sink.screen(), vec!["x / 1/1"]);
    }
}
