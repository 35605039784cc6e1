//! Per-variant frame rendering.
//!
//! The indicator owns the lifecycle (construction, throttling, ETA, close);
//! a [`Strategy`] only turns the current [`ProgressState`] into a [`Frame`].

use crate::error::{ProgressError, Result};
use crate::format::{percent, SizeFormat};

use super::ProgressState;

/// Default fill glyph of the bar.
pub const BAR_FILLED_CHAR: char = '#';
/// Default empty glyph of the bar.
pub const BAR_EMPTY_CHAR: char = ' ';
/// Default glyph appended by the dots indicator.
pub const DOTS_CHAR: char = '.';
/// Rotation of the mill indicator.
pub const MILL_CHARS: [char; 4] = ['|', '/', '-', '\\'];

/// What a strategy wants written for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Erase the current line and write this text in its place.
    Redraw(String),
    /// Append this text to the current line.
    Append(String),
    /// Write nothing.
    Nothing,
}

/// Values computed by the indicator that frames may display.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Formatted remaining time, empty when no estimate is available.
    pub eta: &'a str,
    /// How counts are displayed.
    pub sizes: SizeFormat,
}

/// Renders frames for one indicator style.
pub trait Strategy: Send {
    /// Whether frames show the total, so rendering must wait until it is known.
    fn needs_total(&self) -> bool {
        true
    }

    /// Frame written when the indicator first takes the line.
    fn open(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame>;

    /// Frame written on every throttle-admitted advance.
    fn tick(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame>;

    /// Frame written on close when the last advance was not rendered.
    fn finish(&mut self, _state: &ProgressState, _ctx: &FrameContext<'_>) -> Result<Frame> {
        Ok(Frame::Nothing)
    }
}

impl<T: Strategy + ?Sized> Strategy for Box<T> {
    fn needs_total(&self) -> bool {
        (**self).needs_total()
    }

    fn open(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        (**self).open(state, ctx)
    }

    fn tick(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        (**self).tick(state, ctx)
    }

    fn finish(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        (**self).finish(state, ctx)
    }
}

/// A redrawn `label[###   ] 3/10 05s` bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    /// Glyph for completed cells.
    pub filled_char: char,
    /// Glyph for cells not yet reached.
    pub empty_char: char,
    /// Glyph for the last filled cell; the fill glyph when `None`.
    pub edge_char: Option<char>,
    /// Show a right-aligned percentage after the bar.
    pub show_percent: bool,
}

impl Default for Bar {
    fn default() -> Self {
        Self {
            filled_char: BAR_FILLED_CHAR,
            empty_char: BAR_EMPTY_CHAR,
            edge_char: None,
            show_percent: false,
        }
    }
}

impl Bar {
    /// The bar segment between the brackets.
    pub fn segment(&self, processed: u64, total: u64, width: usize) -> String {
        let filled = if total == 0 {
            width
        } else {
            (width as u128 * processed as u128 / total as u128) as usize
        }
        .min(width);

        let mut segment = String::with_capacity(width);
        if filled > 0 {
            segment.extend(std::iter::repeat(self.filled_char).take(filled - 1));
            segment.push(self.edge_char.unwrap_or(self.filled_char));
        }
        segment.extend(std::iter::repeat(self.empty_char).take(width - filled));
        segment
    }

    fn render(&self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<String> {
        let total = state.total.ok_or(ProgressError::UnknownTotal)?;

        let mut line = String::with_capacity(state.label.len() + state.width + 24);
        line.push_str(&state.label);
        line.push('[');
        line.push_str(&self.segment(state.processed, total, state.width));
        line.push(']');
        if self.show_percent {
            line.push_str(&format!(" {:>3}%", percent(state.processed, total)));
        }
        line.push_str(&format!(
            " {}/{}",
            ctx.sizes.format(state.processed),
            ctx.sizes.format(total)
        ));
        if !ctx.eta.is_empty() {
            line.push(' ');
            line.push_str(ctx.eta);
        }
        Ok(line)
    }
}

impl Strategy for Bar {
    fn open(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        self.render(state, ctx).map(Frame::Redraw)
    }

    fn tick(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        self.render(state, ctx).map(Frame::Redraw)
    }

    fn finish(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        self.render(state, ctx).map(Frame::Redraw)
    }
}

/// Append-only `label....` progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dots {
    /// Glyph appended per rendered step.
    pub glyph: char,
}

impl Default for Dots {
    fn default() -> Self {
        Self { glyph: DOTS_CHAR }
    }
}

impl Strategy for Dots {
    fn needs_total(&self) -> bool {
        false
    }

    fn open(&mut self, state: &ProgressState, _ctx: &FrameContext<'_>) -> Result<Frame> {
        if state.label.is_empty() {
            return Ok(Frame::Nothing);
        }
        Ok(Frame::Append(state.label.clone()))
    }

    fn tick(&mut self, _state: &ProgressState, _ctx: &FrameContext<'_>) -> Result<Frame> {
        Ok(Frame::Append(self.glyph.to_string()))
    }
}

/// A spinning `label | 3/10` indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mill {
    step: usize,
}

impl Mill {
    /// The symbol currently shown.
    pub fn symbol(&self) -> char {
        MILL_CHARS[self.step % MILL_CHARS.len()]
    }

    fn render(&self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<String> {
        let total = state.total.ok_or(ProgressError::UnknownTotal)?;
        Ok(format!(
            "{} {} {}/{}",
            state.label,
            self.symbol(),
            ctx.sizes.format(state.processed),
            ctx.sizes.format(total)
        ))
    }
}

impl Strategy for Mill {
    fn open(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        self.render(state, ctx).map(Frame::Redraw)
    }

    fn tick(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        self.step = (self.step + 1) % MILL_CHARS.len();
        self.render(state, ctx).map(Frame::Redraw)
    }

    fn finish(&mut self, state: &ProgressState, ctx: &FrameContext<'_>) -> Result<Frame> {
        self.render(state, ctx).map(Frame::Redraw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn state(label: &str, processed: u64, total: Option<u64>, width: usize) -> ProgressState {
        ProgressState {
            label: label.to_string(),
            total,
            processed,
            width,
            started_at: Instant::now(),
            hidden: false,
            every: 1,
        }
    }

    const CTX: FrameContext<'static> = FrameContext {
        eta: "",
        sizes: SizeFormat::Count,
    };

    #[test]
    fn test_bar_segment_fill() {
        let bar = Bar::default();
        assert_eq!(bar.segment(0, 4, 4), "    ");
        assert_eq!(bar.segment(1, 4, 4), "#   ");
        assert_eq!(bar.segment(3, 4, 4), "### ");
        assert_eq!(bar.segment(4, 4, 4), "####");
    }

    #[test]
    fn test_bar_segment_floors() {
        let bar = Bar::default();
        // 10 * 1 / 3 = 3.33 -> 3
        assert_eq!(bar.segment(1, 3, 10), "###       ");
        assert_eq!(bar.segment(0, 1000, 10), "          ");
        assert_eq!(bar.segment(99, 1000, 10), "          ");
    }

    #[test]
    fn test_bar_leading_edge() {
        let bar = Bar {
            filled_char: '=',
            empty_char: '-',
            edge_char: Some('>'),
            show_percent: false,
        };
        assert_eq!(bar.segment(0, 4, 8), "--------");
        assert_eq!(bar.segment(1, 4, 8), "=>------");
        assert_eq!(bar.segment(4, 4, 8), "=======>");
    }

    #[test]
    fn test_bar_line_format() {
        let mut bar = Bar::default();
        let frame = bar.tick(&state("Copy ", 2, Some(4), 4), &CTX).unwrap();
        assert_eq!(frame, Frame::Redraw("Copy [##  ] 2/4".to_string()));
    }

    #[test]
    fn test_bar_line_with_eta_and_percent() {
        let mut bar = Bar {
            show_percent: true,
            ..Bar::default()
        };
        let ctx = FrameContext {
            eta: "01m05s",
            sizes: SizeFormat::Count,
        };
        let frame = bar.tick(&state("", 1, Some(4), 4), &ctx).unwrap();
        assert_eq!(frame, Frame::Redraw("[#   ]  25% 1/4 01m05s".to_string()));
    }

    #[test]
    fn test_bar_line_with_byte_sizes() {
        let mut bar = Bar::default();
        let ctx = FrameContext {
            eta: "",
            sizes: SizeFormat::Bytes,
        };
        let frame = bar.tick(&state("", 1024, Some(2048), 2), &ctx).unwrap();
        assert_eq!(frame, Frame::Redraw("[# ] 1.0KB/2.0KB".to_string()));
    }

    #[test]
    fn test_bar_requires_total() {
        let mut bar = Bar::default();
        let err = bar.open(&state("", 0, None, 4), &CTX).unwrap_err();
        assert!(matches!(err, ProgressError::UnknownTotal));
    }

    #[test]
    fn test_dots_frames() {
        let mut dots = Dots::default();
        assert!(!dots.needs_total());
        assert_eq!(
            dots.open(&state("Loading", 0, None, 0), &CTX).unwrap(),
            Frame::Append("Loading".to_string())
        );
        assert_eq!(dots.open(&state("", 0, None, 0), &CTX).unwrap(), Frame::Nothing);
        assert_eq!(
            dots.tick(&state("", 1, None, 0), &CTX).unwrap(),
            Frame::Append(".".to_string())
        );
        assert_eq!(dots.finish(&state("", 1, None, 0), &CTX).unwrap(), Frame::Nothing);
    }

    #[test]
    fn test_mill_rotation() {
        let mut mill = Mill::default();
        let s = |p| state("work", p, Some(5), 0);

        assert_eq!(mill.open(&s(0), &CTX).unwrap(), Frame::Redraw("work | 0/5".into()));
        assert_eq!(mill.tick(&s(1), &CTX).unwrap(), Frame::Redraw("work / 1/5".into()));
        assert_eq!(mill.tick(&s(2), &CTX).unwrap(), Frame::Redraw("work - 2/5".into()));
        assert_eq!(mill.tick(&s(3), &CTX).unwrap(), Frame::Redraw("work \\ 3/5".into()));
        assert_eq!(mill.tick(&s(4), &CTX).unwrap(), Frame::Redraw("work | 4/5".into()));
        // finish redraws without stepping
        assert_eq!(mill.finish(&s(4), &CTX).unwrap(), Frame::Redraw("work | 4/5".into()));
    }

    #[test]
    fn test_boxed_strategy_delegates() {
        let mut boxed: Box<dyn Strategy> = Box::new(Dots::default());
        assert!(!boxed.needs_total());
        assert_eq!(
            boxed.tick(&state("", 1, None, 0), &CTX).unwrap(),
            Frame::Append(".".to_string())
        );
    }
}
