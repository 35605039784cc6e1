//! # Readout - Terminal Progress and Column Printing
//!
//! `readout` draws live, in-place progress lines (bar, dots and mill styles)
//! with a smoothed time-remaining estimate, and prints string grids as
//! aligned columns that fit the terminal width.
//!
//! ## Core Concepts
//!
//! - [`Console`]: Shared handle to an output stream and its single status line
//! - [`ProgressBuilder`]: Configures and builds indicators, or wraps iterators
//! - [`Indicator`]: One live progress session, rendered by a [`Strategy`]
//! - [`RenderGuard`]: Single-owner access to the status line with erase/redraw
//! - [`table`]: Column layout fitted to an available width
//! - [`logging`]: A `tracing` subscriber that prints above the status line
//!
//! ## Quick Start
//!
//! ```rust
//! use readout::{BufferSink, Console, ProgressBuilder};
//!
//! // Console::stderr() in a real program
//! let sink = BufferSink::new();
//! let console = Console::new(sink.clone());
//!
//! let files = ["a.txt", "b.txt", "c.txt", "d.txt"];
//! for file in ProgressBuilder::new()
//!     .label("Copying ")
//!     .width(8)
//!     .wrap_bar(&console, files)
//!     .unwrap()
//! {
//!     if file == "c.txt" {
//!         console.println("c.txt is large").unwrap();
//!     }
//! }
//!
//! assert_eq!(
//!     sink.screen(),
//!     vec!["c.txt is large", "Copying [########] 4/4"]
//! );
//! ```
//!
//! ## Columns
//!
//! ```rust
//! use readout::{print_table, BufferSink, Console};
//!
//! let sink = BufferSink::new();
//! let console = Console::new(sink.clone());
//! let grid = [
//!     ["readout", "0.3.0", "terminal progress"],
//!     ["serde", "1.0", "serialization"],
//! ];
//!
//! print_table(&console, &grid, Some(20)).unwrap();
//! assert_eq!(sink.screen(), vec!["readout 0.3.0 termin", "serde   1.0   serial"]);
//! ```
//!
//! ## Output streams
//!
//! Indicators write to standard error by default so they never mix with
//! data piped from standard output. Nothing here requires a terminal: on a
//! plain stream the table is printed at natural width, and indicators still
//! work (use `hide(true)` to silence them).

pub mod clock;
pub mod config;
mod error;
pub mod eta;
mod format;
mod guard;
pub mod logging;
pub mod progress;
mod sink;
pub mod table;
mod width;

// Error type
pub use error::{ProgressError, Result};

// Output exports
pub use guard::{Console, LineEnd, LineHandle, RenderGuard};
pub use sink::{BufferSink, OutputSink, Stream, TermSink};
pub use width::{FixedWidth, WidthProbe};

// Progress exports
pub use progress::{
    Bar, Dots, Frame, FrameContext, Indicator, Mill, ProgressBuilder, ProgressIter,
    ProgressIterExt, ProgressState, Strategy,
};

// Timing exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use eta::EtaEstimator;

// Formatting exports
pub use format::{format_bytes, format_eta, percent, SizeFormat};

// Table exports
pub use table::{colprint, layout, print_table, ResolvedWidths};

// Configuration exports
pub use config::{IndicatorConfig, IndicatorStyle};
