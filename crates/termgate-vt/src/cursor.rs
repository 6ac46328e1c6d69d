//! Cursor position and visibility.
//!
//! Coordinates are 0-indexed. Every movement clamps to the grid, so the
//! cursor of a non-empty grid always addresses a real cell; for an empty grid
//! it sits at the origin.

use crate::cell::SgrAttrs;

/// Tab stops every 8 columns.
const TAB_WIDTH: u16 = 8;

/// Terminal cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// 0-indexed row.
    pub row: u16,
    /// 0-indexed column.
    pub col: u16,
    /// DECTCEM visibility (`CSI ?25h` / `CSI ?25l`).
    pub visible: bool,
    /// Attributes applied to subsequently printed characters.
    pub attrs: SgrAttrs,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Cursor state captured by DECSC (`ESC 7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCursor {
    pub row: u16,
    pub col: u16,
    pub attrs: SgrAttrs,
}

impl Cursor {
    /// A visible cursor at the origin with default attributes.
    pub const fn new() -> Self {
        Self {
            row: 0,
            col: 0,
            visible: true,
            attrs: SgrAttrs {
                flags: crate::cell::SgrFlags::empty(),
                fg: crate::cell::Color::Default,
                bg: crate::cell::Color::Default,
            },
        }
    }

    /// Position as `(x, y)`, i.e. `(col, row)`.
    pub const fn position(&self) -> (u16, u16) {
        (self.col, self.row)
    }

    /// Clamp into a `cols × rows` grid.
    pub fn clamp(&mut self, cols: u16, rows: u16) {
        self.col = self.col.min(cols.saturating_sub(1));
        self.row = self.row.min(rows.saturating_sub(1));
    }

    /// Absolute move (CUP), clamped.
    pub fn move_to(&mut self, row: u16, col: u16, cols: u16, rows: u16) {
        self.row = row;
        self.col = col;
        self.clamp(cols, rows);
    }

    pub fn move_up(&mut self, n: u16) {
        self.row = self.row.saturating_sub(n);
    }

    pub fn move_down(&mut self, n: u16, rows: u16) {
        self.row = self.row.saturating_add(n).min(rows.saturating_sub(1));
    }

    pub fn move_left(&mut self, n: u16) {
        self.col = self.col.saturating_sub(n);
    }

    pub fn move_right(&mut self, n: u16, cols: u16) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Advance to the next tab stop, stopping at the last column.
    pub fn tab(&mut self, cols: u16) {
        let next = (self.col / TAB_WIDTH + 1).saturating_mul(TAB_WIDTH);
        self.col = next.min(cols.saturating_sub(1));
    }

    /// Capture position and attributes for DECSC.
    pub const fn save(&self) -> SavedCursor {
        SavedCursor {
            row: self.row,
            col: self.col,
            attrs: self.attrs,
        }
    }

    /// Restore a DECSC snapshot, clamped to the current grid.
    pub fn restore(&mut self, saved: SavedCursor, cols: u16, rows: u16) {
        self.attrs = saved.attrs;
        self.move_to(saved.row, saved.col, cols, rows);
    }
}
