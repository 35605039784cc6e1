//! Single-owner access to the terminal status line.
//!
//! A terminal line can only be redrawn correctly by whoever knows exactly
//! what is currently on it: `\r` alone moves the cursor but does not clear
//! a longer previous line. [`RenderGuard`] owns the sink and a single
//! "active line" slot recording the last frame written and how many
//! characters of it are on screen. Erasing blanks exactly that many
//! characters and returns to column zero.
//!
//! Ownership of the slot is explicit: [`RenderGuard::begin`] hands out a
//! [`LineHandle`] that the owner presents to draw, erase, interleave and
//! end. A second `begin` while a line is active fails with
//! [`ProgressError::LineBusy`]; there is one slot, not a stack.
//!
//! [`Console`] is the shared, cloneable handle that indicators and other
//! writers (such as the log writer) use to reach the same guard. The guard
//! does no synchronization of its own; the console's mutex is what
//! serializes writers across threads.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ProgressError, Result};
use crate::sink::{OutputSink, TermSink};

/// Proof of ownership of the active console line.
///
/// Not `Clone`: exactly one owner may draw on the line at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct LineHandle {
    id: u64,
}

/// How an active line is finished when its owner ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnd {
    /// Leave the last frame visible and move to the next line.
    #[default]
    Newline,
    /// Erase the last frame and leave the cursor at column zero.
    Clear,
}

#[derive(Debug)]
struct ActiveLine {
    id: u64,
    /// The most recent frame, kept so it can be redrawn after interleaved output.
    frame: String,
    /// Characters currently visible on the line.
    shown: usize,
}

/// Owns an output sink and the single active-line slot on it.
#[derive(Debug)]
pub struct RenderGuard<S> {
    sink: S,
    active: Option<ActiveLine>,
    next_id: u64,
}

impl<S: OutputSink> RenderGuard<S> {
    /// Wrap a sink. No line is active initially.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            active: None,
            next_id: 0,
        }
    }

    /// The wrapped sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the wrapped sink.
    ///
    /// Writing through this while a line is active bypasses erase/redraw;
    /// prefer [`RenderGuard::print_above`] or [`RenderGuard::interleave`].
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Whether some owner currently holds the line.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Number of characters the active line currently shows (0 if none).
    pub fn last_rendered_length(&self) -> usize {
        self.active.as_ref().map_or(0, |line| line.shown)
    }

    /// Claim the line.
    pub fn begin(&mut self) -> Result<LineHandle> {
        if self.active.is_some() {
            return Err(ProgressError::LineBusy);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.active = Some(ActiveLine {
            id,
            frame: String::new(),
            shown: 0,
        });
        Ok(LineHandle { id })
    }

    /// Replace whatever the line shows with `frame`.
    ///
    /// The previous frame is erased using its own length, so a shorter frame
    /// never leaves residue from a longer one.
    pub fn draw(&mut self, handle: &LineHandle, frame: &str) -> Result<()> {
        self.check(handle)?;
        self.blank()?;
        self.sink.write_str(frame)?;
        self.sink.flush()?;
        if let Some(line) = self.active.as_mut() {
            line.frame.clear();
            line.frame.push_str(frame);
            line.shown = frame.chars().count();
        }
        Ok(())
    }

    /// Append `text` to the line without erasing it.
    pub fn append(&mut self, handle: &LineHandle, text: &str) -> Result<()> {
        self.check(handle)?;
        // After an erase the frame is off screen; put it back before extending it.
        let hidden = self
            .active
            .as_ref()
            .is_some_and(|line| line.shown < line.frame.chars().count());
        if hidden {
            self.redraw()?;
        }
        self.sink.write_str(text)?;
        self.sink.flush()?;
        if let Some(line) = self.active.as_mut() {
            line.frame.push_str(text);
            line.shown = line.frame.chars().count();
        }
        Ok(())
    }

    /// Blank the line and return the cursor to column zero.
    pub fn erase(&mut self, handle: &LineHandle) -> Result<()> {
        self.check(handle)?;
        self.blank()?;
        Ok(())
    }

    /// Erase the line, run `write`, then redraw the last frame.
    ///
    /// Output from `write` should end with a newline so the redrawn frame
    /// lands on a fresh line below it.
    pub fn interleave<F>(&mut self, handle: &LineHandle, write: F) -> Result<()>
    where
        F: FnOnce(&mut S) -> io::Result<()>,
    {
        self.check(handle)?;
        self.blank()?;
        write(&mut self.sink)?;
        self.redraw()?;
        Ok(())
    }

    /// Print `text` above the active line, if there is one.
    ///
    /// This is the entry point for writers that do not own the line:
    /// informational messages and log output. With no active line it is a
    /// plain write.
    pub fn print_above(&mut self, text: &str) -> io::Result<()> {
        if self.active.is_none() {
            self.sink.write_str(text)?;
            return self.sink.flush();
        }
        self.blank()?;
        self.sink.write_str(text)?;
        self.redraw()
    }

    /// Release the line.
    ///
    /// The slot is freed before anything is written, so a failed write never
    /// leaves the line claimed.
    pub fn end(&mut self, handle: LineHandle, how: LineEnd) -> Result<()> {
        self.check(&handle)?;
        let Some(line) = self.active.take() else {
            return Err(ProgressError::StaleHandle);
        };
        match how {
            LineEnd::Newline if line.shown > 0 => self.sink.write_str("\n")?,
            LineEnd::Newline => {}
            LineEnd::Clear => blank_chars(&mut self.sink, line.shown)?,
        }
        self.sink.flush()?;
        Ok(())
    }

    /// Consume the guard and return the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }

    fn check(&self, handle: &LineHandle) -> Result<()> {
        match &self.active {
            Some(line) if line.id == handle.id => Ok(()),
            _ => Err(ProgressError::StaleHandle),
        }
    }

    fn blank(&mut self) -> io::Result<()> {
        let Some(line) = self.active.as_mut() else {
            return Ok(());
        };
        let shown = std::mem::take(&mut line.shown);
        blank_chars(&mut self.sink, shown)
    }

    fn redraw(&mut self) -> io::Result<()> {
        if let Some(line) = self.active.as_mut() {
            self.sink.write_str(&line.frame)?;
            line.shown = line.frame.chars().count();
        }
        self.sink.flush()
    }
}

fn blank_chars<S: OutputSink>(sink: &mut S, count: usize) -> io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    let mut seq = String::with_capacity(count + 2);
    seq.push('\r');
    seq.extend(std::iter::repeat(' ').take(count));
    seq.push('\r');
    sink.write_str(&seq)?;
    sink.flush()
}

/// Shared handle to a [`RenderGuard`].
///
/// Cloning is cheap; every clone reaches the same sink and the same active
/// line.
#[derive(Debug)]
pub struct Console<S> {
    inner: Arc<Mutex<RenderGuard<S>>>,
}

impl<S> Clone for Console<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Console<TermSink> {
    /// Console writing to standard error.
    pub fn stderr() -> Self {
        Self::new(TermSink::stderr())
    }

    /// Console writing to standard output.
    pub fn stdout() -> Self {
        Self::new(TermSink::stdout())
    }
}

impl<S: OutputSink> Console<S> {
    /// Create a console around a sink.
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RenderGuard::new(sink))),
        }
    }

    /// Lock the guard for a sequence of operations.
    ///
    /// Do not call other `Console` methods while holding the lock.
    pub fn lock(&self) -> MutexGuard<'_, RenderGuard<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Print `text` above the active line, if any. See [`RenderGuard::print_above`].
    pub fn print_above(&self, text: &str) -> io::Result<()> {
        self.lock().print_above(text)
    }

    /// Print a line of text above the active line, adding the newline.
    pub fn println(&self, text: &str) -> io::Result<()> {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.print_above(&line)
    }

    /// Whether an indicator currently owns the line.
    pub fn is_active(&self) -> bool {
        self.lock().is_active()
    }
}
