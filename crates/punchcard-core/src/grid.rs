//! Boolean punch/LED matrix shared by the encoder, the animation generator and
//! the scheduler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-size row-major grid of punch (or LED) states.
///
/// Dimensions never change after construction. Reads outside the grid return
/// `false` and writes outside it are ignored, so a display fed from a grid is
/// always in a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Create an all-false grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Create a grid whose cells are computed from their coordinates
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    /// Build a grid from nested rows. Returns `None` when the rows are ragged.
    pub fn from_rows(rows: &[Vec<bool>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Cell state; `false` outside the grid
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        if self.contains(row, col) {
            self.cells[row * self.cols + col]
        } else {
            false
        }
    }

    /// Set a cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if self.contains(row, col) {
            self.cells[row * self.cols + col] = value;
        } else {
            tracing::trace!(
                row,
                col,
                rows = self.rows,
                cols = self.cols,
                "Ignoring write outside grid"
            );
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn fill(&mut self, value: bool) {
        self.cells.fill(value);
    }

    /// One row as a slice; empty outside the grid
    pub fn row(&self, row: usize) -> &[bool] {
        if row < self.rows {
            &self.cells[row * self.cols..(row + 1) * self.cols]
        } else {
            &[]
        }
    }

    /// One column, top to bottom; empty outside the grid
    pub fn column(&self, col: usize) -> Vec<bool> {
        if col >= self.cols {
            return Vec::new();
        }
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Replace every cell with the contents of `other` in one step.
    ///
    /// Grids of a different size are copied over their overlapping region and
    /// the rest is cleared, keeping this grid's dimensions.
    pub fn apply(&mut self, other: &Grid) {
        if self.dimensions() == other.dimensions() {
            self.cells.copy_from_slice(&other.cells);
            return;
        }
        tracing::warn!(
            "Applying {}x{} frame to {}x{} grid, copying overlap only",
            other.rows,
            other.cols,
            self.rows,
            self.cols
        );
        let mut next = Grid::new(self.rows, self.cols);
        next.paste(other, 0);
        self.cells = next.cells;
    }

    /// Copy `src` into this grid starting at column `col_offset`; cells that
    /// fall outside are dropped.
    pub fn paste(&mut self, src: &Grid, col_offset: usize) {
        for row in 0..src.rows.min(self.rows) {
            for col in 0..src.cols {
                let target = col + col_offset;
                if target >= self.cols {
                    break;
                }
                self.cells[row * self.cols + target] = src.get(row, col);
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Number of punched (lit) cells
    pub fn count_lit(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Coordinates of punched cells in row-major order
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &lit)| lit)
            .map(move |(i, _)| (i / cols, i % cols))
    }

    /// Nested row vectors, the shape used by animation resources and the
    /// hardware wire format
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for &cell in self.row(row) {
                f.write_str(if cell { "#" } else { "." })?;
            }
            if row + 1 < self.rows {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
