//! Row-major grid addressing over a flat variable sequence.

use super::store::VarId;
use crate::error::{CpError, Result};

/// A 2D view over a flat list of variable handles.
///
/// Cell `(col, row)` lives at index `col + row * width`. Rows, columns and
/// rectangular slices are returned as new handle vectors, ready to be
/// passed to a constraint.
///
/// # Examples
///
/// ```
/// use u_cpsolve::space::Space;
/// use u_cpsolve::var::Matrix;
///
/// let mut space = Space::new();
/// let cells = space.int_vars(6, 0, 1).unwrap();
/// let m = Matrix::new(cells, 3, 2).unwrap();
/// assert_eq!(m.row(1).len(), 3);
/// assert_eq!(m.col(2).len(), 2);
/// assert_eq!(m.slice(0, 2, 0, 2).len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    cells: Vec<VarId>,
    width: usize,
    height: usize,
}

impl Matrix {
    /// Wraps `cells` as a `width` x `height` grid.
    pub fn new(cells: Vec<VarId>, width: usize, height: usize) -> Result<Self> {
        if cells.len() != width * height {
            return Err(CpError::ArgumentSizeMismatch {
                constraint: "matrix",
                detail: format!(
                    "{} cells cannot form a {width}x{height} grid",
                    cells.len()
                ),
            });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The handle at column `col`, row `row`.
    pub fn get(&self, col: usize, row: usize) -> VarId {
        assert!(col < self.width && row < self.height, "cell out of range");
        self.cells[col + row * self.width]
    }

    /// All cells of row `row`, left to right.
    pub fn row(&self, row: usize) -> Vec<VarId> {
        self.slice(0, self.width, row, row + 1)
    }

    /// All cells of column `col`, top to bottom.
    pub fn col(&self, col: usize) -> Vec<VarId> {
        self.slice(col, col + 1, 0, self.height)
    }

    /// Cells in columns `[col_from, col_to)` and rows `[row_from, row_to)`,
    /// row by row.
    pub fn slice(&self, col_from: usize, col_to: usize, row_from: usize, row_to: usize) -> Vec<VarId> {
        let col_to = col_to.min(self.width);
        let row_to = row_to.min(self.height);
        let mut out = Vec::new();
        for row in row_from..row_to {
            for col in col_from..col_to {
                out.push(self.cells[col + row * self.width]);
            }
        }
        out
    }

    /// The underlying cells in row-major order.
    pub fn cells(&self) -> &[VarId] {
        &self.cells
    }
}
