//! Column-aligned printing of string grids.
//!
//! Widths are computed from the data, then fitted to the available width by
//! working from the right: the rightmost column is dropped while it is no
//! wider than the excess, otherwise it is narrowed to absorb the excess.
//! The leftmost columns, usually the most significant, are never touched
//! before everything to their right is gone.
//!
//! Width is measured in characters, not rendered glyph width.
//!
//! ```rust
//! use readout::table::layout;
//!
//! let lines = layout(&[["a", "bb"], ["ccc", "d"]], None);
//! assert_eq!(lines, vec!["a   bb", "ccc d"]);
//! ```

use tracing::debug;

use crate::error::Result;
use crate::guard::Console;
use crate::sink::OutputSink;
use crate::width::WidthProbe;

/// Resolved widths for all columns in a table.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ResolvedWidths {
    /// Width of each column in characters, separator included.
    pub widths: Vec<usize>,
}

impl ResolvedWidths {
    /// Get the width of a specific column.
    pub fn get(&self, index: usize) -> Option<usize> {
        self.widths.get(index).copied()
    }

    /// Get the total width of all columns.
    pub fn total(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Drop or narrow columns from the right until the total fits `available`.
    ///
    /// The rightmost column is dropped whole while its width is no more than
    /// the excess. Otherwise it is narrowed by the excess and fitting stops.
    pub fn fit(mut self, available: usize) -> Self {
        while self.total() > available {
            let excess = self.total() - available;
            let Some(last) = self.widths.last_mut() else {
                break;
            };
            if *last <= excess {
                self.widths.pop();
            } else {
                *last -= excess;
                break;
            }
        }
        self
    }
}

/// Natural column widths of a grid.
///
/// Each column is one wider than its longest cell, reserving a separating
/// space; the last column has no separator. Short rows count as if padded
/// with empty cells.
pub fn natural_widths<R, C>(grid: &[R]) -> ResolvedWidths
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let columns = grid.iter().map(|row| row.as_ref().len()).max().unwrap_or(0);
    let mut widths = vec![1; columns];
    for row in grid {
        for (width, cell) in widths.iter_mut().zip(row.as_ref()) {
            *width = (*width).max(cell.as_ref().chars().count() + 1);
        }
    }
    if let Some(last) = widths.last_mut() {
        *last -= 1;
    }
    ResolvedWidths { widths }
}

/// Natural widths, fitted to `available` when it is known.
pub fn resolve_widths<R, C>(grid: &[R], available: Option<usize>) -> ResolvedWidths
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let natural = natural_widths(grid);
    match available {
        Some(available) => natural.fit(available),
        None => natural,
    }
}

/// Format a grid into aligned lines.
///
/// Cells are left-justified and cut to their column's width. The last
/// column is not padded, so lines carry no trailing separator. An empty grid
/// (or one whose rows are all empty) produces no lines. If fitting drops
/// every column, each row becomes an empty line.
///
/// Unlike classic `colprint` implementations, the last column is left
/// unpadded on purpose (`"ccc d"`, not `"ccc d "`).
pub fn layout<R, C>(grid: &[R], available: Option<usize>) -> Vec<String>
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let natural = natural_widths(grid);
    if natural.is_empty() {
        return Vec::new();
    }
    let widths = match available {
        Some(available) => natural.clone().fit(available),
        None => natural.clone(),
    };
    if widths != natural {
        debug!(
            natural = natural.total(),
            available = ?available,
            columns = widths.len(),
            dropped = natural.len() - widths.len(),
            "table narrowed to fit"
        );
    }

    grid.iter()
        .map(|row| format_row(row.as_ref(), &widths))
        .collect()
}

fn format_row<C: AsRef<str>>(row: &[C], widths: &ResolvedWidths) -> String {
    let mut line = String::with_capacity(widths.total());
    let last = widths.len().saturating_sub(1);
    for (index, &width) in widths.widths.iter().enumerate() {
        let cell = row.get(index).map_or("", |c| c.as_ref());
        let mut shown = 0;
        for ch in cell.chars().take(width) {
            line.push(ch);
            shown += 1;
        }
        if index < last {
            line.extend(std::iter::repeat(' ').take(width - shown));
        }
    }
    line
}

/// Lay out a grid and print it above any active progress line.
pub fn print_table<S, R, C>(console: &Console<S>, grid: &[R], available: Option<usize>) -> Result<()>
where
    S: OutputSink,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let lines = layout(grid, available);
    if lines.is_empty() {
        return Ok(());
    }
    let mut text = String::new();
    for line in lines {
        text.push_str(&line);
        text.push('\n');
    }
    console.print_above(&text)?;
    Ok(())
}

/// Print a grid fitted to the console's terminal width.
///
/// One column is left free so a full-width line never makes the terminal
/// wrap onto an empty line. When the console is not a terminal the grid is
/// printed at its natural width.
pub fn colprint<S, R, C>(console: &Console<S>, grid: &[R]) -> Result<()>
where
    S: OutputSink + WidthProbe,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let available = console
        .lock()
        .sink()
        .current_width()
        .map(|width| width.saturating_sub(1));
    print_table(console, grid, available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::LineEnd;
    use crate::sink::BufferSink;

    fn widths(w: &[usize]) -> ResolvedWidths {
        ResolvedWidths { widths: w.to_vec() }
    }

    #[test]
    fn natural_widths_reserve_separator() {
        let grid = [["a", "bb"], ["ccc", "d"]];
        assert_eq!(natural_widths(&grid), widths(&[4, 2]));
    }

    #[test]
    fn natural_widths_pad_jagged_rows() {
        let grid = vec![vec!["name", "size", "kind"], vec!["x"]];
        assert_eq!(natural_widths(&grid), widths(&[5, 5, 4]));
    }

    #[test]
    fn natural_widths_empty_grid() {
        let grid: Vec<Vec<String>> = Vec::new();
        assert!(natural_widths(&grid).is_empty());

        let rows_without_cells: Vec<Vec<String>> = vec![vec![], vec![]];
        assert!(natural_widths(&rows_without_cells).is_empty());
    }

    #[test]
    fn fit_leaves_fitting_tables_alone() {
        assert_eq!(widths(&[4, 2]).fit(6), widths(&[4, 2]));
        assert_eq!(widths(&[4, 2]).fit(80), widths(&[4, 2]));
    }

    #[test]
    fn fit_drops_column_no_wider_than_excess() {
        // 50 wide, 30 available: excess 20, rightmost column is exactly 20.
        let fitted = widths(&[10, 10, 10, 20]).fit(30);
        assert_eq!(fitted, widths(&[10, 10, 10]));
    }

    #[test]
    fn fit_shrinks_column_wider_than_excess() {
        // 50 wide, 30 available: excess 20, rightmost column 25 is narrowed to 5.
        let fitted = widths(&[10, 15, 25]).fit(30);
        assert_eq!(fitted, widths(&[10, 15, 5]));
        assert_eq!(fitted.total(), 30);
    }

    #[test]
    fn fit_drops_then_shrinks() {
        let fitted = widths(&[10, 10, 3, 2]).fit(12);
        assert_eq!(fitted, widths(&[10, 2]));
    }

    #[test]
    fn fit_can_drop_everything() {
        assert!(widths(&[3, 2]).fit(0).is_empty());
    }

    #[test]
    fn layout_natural_width() {
        let lines = layout(&[["a", "bb"], ["ccc", "d"]], None);
        assert_eq!(lines, vec!["a   bb", "ccc d"]);
    }

    #[test]
    fn layout_truncates_rightmost_column() {
        let grid = [["id", "description"], ["1", "a long piece of text"]];
        // natural [3, 20], narrowed to [3, 7]
        let lines = layout(&grid, Some(10));
        assert_eq!(lines, vec!["id descrip", "1  a long "]);
    }

    #[test]
    fn layout_empty_grid() {
        let grid: Vec<Vec<&str>> = Vec::new();
        assert!(layout(&grid, Some(80)).is_empty());
        assert!(layout(&grid, None).is_empty());
    }

    #[test]
    fn layout_all_columns_dropped() {
        let lines = layout(&[["abc", "de"]], Some(0));
        assert_eq!(lines, vec![""]);
    }

    #[test]
    fn print_table_without_width() {
        let sink = BufferSink::new();
        let console = Console::new(sink.clone());
        print_table(&console, &[["a", "bb"], ["ccc", "d"]], None).unwrap();
        assert_eq!(sink.contents(), "a   bb\nccc d\n");
    }

    #[test]
    fn print_table_empty_grid_writes_nothing() {
        let sink = BufferSink::new();
        let console = Console::new(sink.clone());
        let grid: Vec<Vec<String>> = Vec::new();
        print_table(&console, &grid, Some(10)).unwrap();
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn print_table_above_active_line() {
        let sink = BufferSink::new();
        let console = Console::new(sink.clone());
        let handle = console.lock().begin().unwrap();
        console.lock().draw(&handle, "[##  ] 2/4").unwrap();

        print_table(&console, &[["x", "y"]], None).unwrap();
        assert_eq!(sink.screen(), vec!["x y", "[##  ] 2/4"]);
        console.lock().end(handle, LineEnd::Newline).unwrap();
    }

    #[test]
    fn colprint_reserves_one_column() {
        let sink = BufferSink::terminal(7);
        let console = Console::new(sink.clone());
        // natural widths [4, 3]: 7 columns, 6 available
        colprint(&console, &[["abc", "def"]]).unwrap();
        assert_eq!(sink.contents(), "abc de\n");
    }

    #[test]
    fn colprint_without_terminal_uses_natural_width() {
        let sink = BufferSink::new();
        let console = Console::new(sink.clone());
        colprint(&console, &[["abc", "defghijklmnop"]]).unwrap();
        assert_eq!(sink.contents(), "abc defghijklmnop\n");
    }
}
