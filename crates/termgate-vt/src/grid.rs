//! Terminal grid: 2D cell matrix representing the visible screen.
//!
//! The grid owns a flat vector of cells indexed by `(row, col)` and provides
//! the operations the VT parser dispatches (print, erase, resize). Every
//! operation clips against the grid, so a 0×0 grid accepts them all.

use crate::cell::{Cell, Color, SgrAttrs};

/// 2D terminal cell grid.
///
/// Cells are stored in row-major order in a flat `Vec<Cell>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    cols: u16,
    rows: u16,
}

impl Grid {
    /// Create a new grid filled with default (blank) cells.
    pub fn new(cols: u16, rows: u16) -> Self {
        let len = (cols as usize) * (rows as usize);
        Self {
            cells: vec![Cell::default(); len],
            cols,
            rows,
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Get a reference to the cell at `(row, col)`.
    ///
    /// Returns `None` if out of bounds.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            Some(&self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Get a mutable reference to the cell at `(row, col)`.
    ///
    /// Returns `None` if out of bounds.
    pub fn cell_mut(&mut self, row: u16, col: u16) -> Option<&mut Cell> {
        if row < self.rows && col < self.cols {
            let idx = self.index(row, col);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Get a slice of cells for the given row.
    ///
    /// Returns `None` if `row` is out of bounds.
    pub fn row_cells(&self, row: u16) -> Option<&[Cell]> {
        if row < self.rows {
            let start = (row as usize) * (self.cols as usize);
            let end = start + (self.cols as usize);
            Some(&self.cells[start..end])
        } else {
            None
        }
    }

    /// Text content of a row, trailing spaces included.
    pub fn row_text(&self, row: u16) -> Option<String> {
        self.row_cells(row)
            .map(|cells| cells.iter().map(Cell::content).collect())
    }

    /// Iterate over rows as cell slices, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks_exact panics on 0; an empty grid has no cells to chunk anyway.
        self.cells.chunks_exact(usize::from(self.cols.max(1)))
    }

    /// Write a character at `(row, col)`. Out-of-bounds writes are dropped.
    pub fn put(&mut self, row: u16, col: u16, ch: char, attrs: SgrAttrs) {
        if let Some(cell) = self.cell_mut(row, col) {
            *cell = Cell::with_attrs(ch, attrs);
        }
    }

    // ── Erase operations ────────────────────────────────────────────

    /// ED 0: Erase from cursor to end of display.
    pub fn erase_below(&mut self, row: u16, col: u16, bg: Color) {
        if row >= self.rows {
            return;
        }
        self.erase_line_right(row, col, bg);
        for r in row + 1..self.rows {
            self.erase_line(r, bg);
        }
    }

    /// ED 1: Erase from start of display to cursor (inclusive).
    pub fn erase_above(&mut self, row: u16, col: u16, bg: Color) {
        if row >= self.rows {
            return;
        }
        for r in 0..row {
            self.erase_line(r, bg);
        }
        self.erase_line_left(row, col, bg);
    }

    /// ED 2: Erase entire display.
    pub fn erase_all(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
    }

    /// EL 0: Erase from cursor to end of line.
    pub fn erase_line_right(&mut self, row: u16, col: u16, bg: Color) {
        self.erase_range(row, col, self.cols, bg);
    }

    /// EL 1: Erase from start of line to cursor (inclusive).
    pub fn erase_line_left(&mut self, row: u16, col: u16, bg: Color) {
        let end = col.saturating_add(1).min(self.cols);
        self.erase_range(row, 0, end, bg);
    }

    /// EL 2: Erase entire line.
    pub fn erase_line(&mut self, row: u16, bg: Color) {
        self.erase_range(row, 0, self.cols, bg);
    }

    /// Erase `[start_col, end_col)` of one row, clipped to the grid.
    fn erase_range(&mut self, row: u16, start_col: u16, end_col: u16, bg: Color) {
        if row >= self.rows {
            return;
        }
        let end_col = end_col.min(self.cols);
        if start_col >= end_col {
            return;
        }
        let start = self.index(row, start_col);
        let end = self.index(row, end_col - 1) + 1;
        for cell in &mut self.cells[start..end] {
            cell.erase(bg);
        }
    }

    /// Reset every cell to a default blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    // ── Resize ──────────────────────────────────────────────────────

    /// Reallocate the grid at new dimensions, blank.
    ///
    /// Prior content is discarded; the screen is redrawn by the application
    /// after a resize.
    pub fn resize(&mut self, new_cols: u16, new_rows: u16) {
        *self = Self::new(new_cols, new_rows);
    }

    /// Convert (row, col) to flat index.
    #[inline]
    fn index(&self, row: u16, col: u16) -> usize {
        (row as usize) * (self.cols as usize) + (col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(g: &mut Grid, ch: char) {
        for r in 0..g.rows() {
            for c in 0..g.cols() {
                g.put(r, c, ch, SgrAttrs::default());
            }
        }
    }

    #[test]
    fn new_grid_has_correct_dimensions() {
        let g = Grid::new(80, 24);
        assert_eq!(g.cols(), 80);
        assert_eq!(g.rows(), 24);
        assert_eq!(g.rows_iter().count(), 24);
    }

    #[test]
    fn cells_default_to_space() {
        let g = Grid::new(10, 5);
        assert_eq!(g.cell(0, 0).unwrap().content(), ' ');
    }

    #[test]
    fn out_of_bounds_returns_none() {
        let g = Grid::new(10, 5);
        assert!(g.cell(5, 0).is_none());
        assert!(g.cell(0, 10).is_none());
        assert!(g.row_text(5).is_none());
    }

    #[test]
    fn put_and_row_text() {
        let mut g = Grid::new(4, 2);
        g.put(1, 0, 'A', SgrAttrs::default());
        g.put(1, 3, 'D', SgrAttrs::default());
        g.put(1, 4, 'X', SgrAttrs::default());
        assert_eq!(g.row_text(1).unwrap(), "A  D");
    }

    #[test]
    fn erase_below_from_mid_row() {
        let mut g = Grid::new(3, 3);
        fill(&mut g, 'x');
        g.erase_below(1, 1, Color::Default);
        assert_eq!(g.row_text(0).unwrap(), "xxx");
        assert_eq!(g.row_text(1).unwrap(), "x  ");
        assert_eq!(g.row_text(2).unwrap(), "   ");
    }

    #[test]
    fn erase_above_from_mid_row() {
        let mut g = Grid::new(3, 3);
        fill(&mut g, 'x');
        g.erase_above(1, 1, Color::Default);
        assert_eq!(g.row_text(0).unwrap(), "   ");
        assert_eq!(g.row_text(1).unwrap(), "  x");
        assert_eq!(g.row_text(2).unwrap(), "xxx");
    }

    #[test]
    fn erase_line_variants() {
        let mut g = Grid::new(5, 1);
        fill(&mut g, 'x');
        g.erase_line_right(0, 3, Color::Default);
        assert_eq!(g.row_text(0).unwrap(), "xxx  ");
        fill(&mut g, 'x');
        g.erase_line_left(0, 1, Color::Default);
        assert_eq!(g.row_text(0).unwrap(), "  xxx");
        g.erase_line(0, Color::Default);
        assert_eq!(g.row_text(0).unwrap(), "     ");
    }

    #[test]
    fn erase_out_of_bounds_is_safe() {
        let mut g = Grid::new(3, 3);
        g.erase_below(10, 10, Color::Default);
        g.erase_above(10, 10, Color::Default);
        g.erase_line_right(0, 10, Color::Default);
        g.erase_line_left(0, u16::MAX, Color::Default);
    }

    #[test]
    fn resize_blanks_content() {
        let mut g = Grid::new(3, 3);
        fill(&mut g, 'x');
        g.resize(5, 2);
        assert_eq!(g.cols(), 5);
        assert_eq!(g.rows(), 2);
        assert!(g.rows_iter().flatten().all(Cell::is_blank));
    }

    #[test]
    fn zero_size_grid() {
        let mut g = Grid::new(0, 0);
        assert!(g.cell(0, 0).is_none());
        g.put(0, 0, 'x', SgrAttrs::default());
        g.erase_all(Color::Default);
        g.erase_below(0, 0, Color::Default);
        assert_eq!(g.rows_iter().count(), 0);
    }
}
