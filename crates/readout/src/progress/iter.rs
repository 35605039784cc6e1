//! Iterator decorator that advances an indicator as elements are consumed.
//!
//! Each element is handed to the caller first; the indicator advances when
//! the caller asks for the next one (or when the source runs out), so the
//! display counts completed work rather than work in progress.

use std::iter::FusedIterator;

use tracing::debug;

use crate::error::{ProgressError, Result};
use crate::guard::Console;
use crate::sink::OutputSink;

use super::{Indicator, Strategy};

/// An iterator that drives a progress indicator.
///
/// Built by the `wrap*` methods of [`ProgressBuilder`](super::ProgressBuilder)
/// or by [`ProgressIterExt::with_progress`]. When the source is exhausted the
/// indicator is closed. Breaking out early and dropping the iterator also
/// closes it, without counting the element that was being processed.
///
/// Write errors cannot surface through [`Iterator::next`]; the first one is
/// kept and returned by [`ProgressIter::finish`]. A reader that went away
/// (broken pipe) is not treated as an error.
///
/// # Panics
///
/// `next` panics if the source yields more elements than the indicator's
/// total, the same precondition that makes [`Indicator::advance`] fail.
pub struct ProgressIter<I, S: OutputSink, R: Strategy> {
    iter: I,
    indicator: Option<Indicator<S, R>>,
    console: Console<S>,
    hidden: bool,
    /// An element was yielded and not yet counted.
    pending: bool,
    error: Option<ProgressError>,
}

impl<I, S, R> ProgressIter<I, S, R>
where
    I: Iterator,
    S: OutputSink,
    R: Strategy,
{
    pub(super) fn new(iter: I, indicator: Indicator<S, R>) -> Self {
        Self {
            iter,
            console: indicator.console().clone(),
            hidden: indicator.state().hidden,
            indicator: Some(indicator),
            pending: false,
            error: None,
        }
    }

    /// A decorator with nothing to show, for empty sources.
    pub(super) fn idle(iter: I, console: Console<S>, hidden: bool) -> Self {
        Self {
            iter,
            indicator: None,
            console,
            hidden,
            pending: false,
            error: None,
        }
    }

    /// The indicator, until the source is exhausted.
    pub fn indicator(&self) -> Option<&Indicator<S, R>> {
        self.indicator.as_ref()
    }

    /// Count the element in hand, close the indicator and report the first
    /// write error seen while iterating.
    pub fn finish(mut self) -> Result<()> {
        self.complete_pending();
        self.close_indicator();
        self.error.take().map_or(Ok(()), Err)
    }

    /// Like [`finish`](Self::finish), then print `message` on its own line
    /// unless the indicator is hidden.
    pub fn finish_with_message(mut self, message: &str) -> Result<()> {
        self.complete_pending();
        self.close_indicator();
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if !self.hidden {
            if let Err(err) = self.console.println(message) {
                let err = ProgressError::from(err);
                if !err.is_broken_pipe() {
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn complete_pending(&mut self) {
        if !std::mem::take(&mut self.pending) {
            return;
        }
        let Some(indicator) = self.indicator.as_mut() else {
            return;
        };
        match indicator.advance(1) {
            Ok(()) => {}
            Err(err @ ProgressError::Io(_)) => self.record(err),
            Err(err) => panic!("progress iterator: {err}"),
        }
    }

    fn close_indicator(&mut self) {
        if let Some(indicator) = self.indicator.take() {
            if let Err(err) = indicator.close() {
                self.record(err);
            }
        }
    }

    fn record(&mut self, err: ProgressError) {
        if err.is_broken_pipe() {
            debug!("output stream closed while iterating");
            return;
        }
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl<I, S, R> Iterator for ProgressIter<I, S, R>
where
    I: Iterator,
    S: OutputSink,
    R: Strategy,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.complete_pending();
        match self.iter.next() {
            Some(item) => {
                self.pending = self.indicator.is_some();
                Some(item)
            }
            None => {
                self.close_indicator();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I, S, R> ExactSizeIterator for ProgressIter<I, S, R>
where
    I: ExactSizeIterator,
    S: OutputSink,
    R: Strategy,
{
}

impl<I, S, R> FusedIterator for ProgressIter<I, S, R>
where
    I: FusedIterator,
    S: OutputSink,
    R: Strategy,
{
}

/// Adds [`with_progress`](ProgressIterExt::with_progress) to every iterator.
pub trait ProgressIterExt: Iterator + Sized {
    /// Advance `indicator` by one for each element consumed.
    ///
    /// ```rust
    /// use readout::{BufferSink, Console, ProgressBuilder, ProgressIterExt};
    ///
    /// let sink = BufferSink::new();
    /// let console = Console::new(sink.clone());
    /// let mill = ProgressBuilder::new()
    ///     .label("Sum")
    ///     .expected_size(4)
    ///     .mill(&console)
    ///     .unwrap();
    ///
    /// let total: u32 = (1..=4).with_progress(mill).sum();
    /// assert_eq!(total, 10);
    /// assert_eq!(sink.screen(), vec!["Sum | 4/4"]);
    /// ```
    fn with_progress<S, R>(self, indicator: Indicator<S, R>) -> ProgressIter<Self, S, R>
    where
        S: OutputSink,
        R: Strategy,
    {
        ProgressIter::new(self, indicator)
    }
}

impl<I: Iterator> ProgressIterExt for I {}
