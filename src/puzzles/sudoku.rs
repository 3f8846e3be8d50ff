//! 9×9 sudoku with `Distinct` on rows, columns and blocks.

use crate::branch::{BranchConfig, ValSelection, VarSelection};
use crate::error::{CpError, Result};
use crate::space::Space;
use crate::var::{DomainFailure, Matrix};
use std::fmt;
use tracing::debug;

/// A 9×9 board, row by row. `0` marks an empty cell.
pub type Board = [[u8; 9]; 9];

/// Sample boards, from easy to search-heavy.
pub const BOARDS: [Board; 6] = [
    [
        [0, 0, 0, 2, 0, 5, 0, 0, 0],
        [0, 9, 0, 0, 0, 0, 7, 3, 0],
        [0, 0, 2, 0, 0, 9, 0, 6, 0],
        [2, 0, 0, 0, 0, 0, 4, 0, 9],
        [0, 0, 0, 0, 7, 0, 0, 0, 0],
        [6, 0, 9, 0, 0, 0, 0, 0, 1],
        [0, 8, 0, 4, 0, 0, 1, 0, 0],
        [0, 6, 3, 0, 0, 0, 0, 8, 0],
        [0, 0, 0, 6, 0, 8, 0, 0, 0],
    ],
    [
        [3, 0, 0, 9, 0, 4, 0, 0, 1],
        [0, 0, 2, 0, 0, 0, 4, 0, 0],
        [0, 6, 1, 0, 0, 0, 7, 9, 0],
        [6, 0, 0, 2, 4, 7, 0, 0, 5],
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [2, 0, 0, 8, 3, 6, 0, 0, 4],
        [0, 4, 6, 0, 0, 0, 2, 3, 0],
        [0, 0, 9, 0, 0, 0, 6, 0, 0],
        [5, 0, 0, 3, 0, 9, 0, 0, 8],
    ],
    // Times London, 21 April 2005 ("fiendish")
    [
        [0, 0, 4, 0, 0, 3, 0, 7, 0],
        [0, 8, 0, 0, 7, 0, 0, 0, 0],
        [0, 7, 0, 0, 0, 8, 2, 0, 5],
        [4, 0, 0, 0, 0, 0, 3, 1, 0],
        [9, 0, 0, 0, 0, 0, 0, 0, 8],
        [0, 1, 5, 0, 0, 0, 0, 0, 4],
        [1, 0, 6, 9, 0, 0, 0, 3, 0],
        [0, 0, 0, 0, 2, 0, 0, 6, 0],
        [0, 2, 0, 4, 0, 0, 5, 0, 0],
    ],
    [
        [0, 4, 3, 0, 8, 0, 2, 5, 0],
        [6, 0, 0, 0, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 1, 0, 9, 4],
        [9, 0, 0, 0, 0, 4, 0, 7, 0],
        [0, 0, 0, 6, 0, 8, 0, 0, 0],
        [0, 1, 0, 2, 0, 0, 0, 0, 3],
        [8, 2, 0, 5, 0, 0, 0, 0, 0],
        [0, 0, 0, 0, 0, 0, 0, 0, 5],
        [0, 3, 4, 0, 9, 0, 7, 1, 0],
    ],
    [
        [0, 0, 0, 0, 0, 3, 0, 6, 0],
        [0, 0, 0, 0, 0, 0, 0, 1, 0],
        [0, 9, 7, 5, 0, 0, 0, 8, 0],
        [0, 0, 0, 0, 9, 0, 2, 0, 0],
        [0, 0, 8, 0, 7, 0, 4, 0, 0],
        [0, 0, 3, 0, 6, 0, 0, 0, 0],
        [0, 1, 0, 0, 0, 2, 8, 9, 0],
        [0, 4, 0, 0, 0, 0, 0, 0, 0],
        [0, 5, 0, 1, 0, 0, 0, 0, 0],
    ],
    // nearly complete
    [
        [2, 5, 8, 1, 0, 4, 0, 3, 7],
        [9, 3, 6, 8, 2, 7, 5, 1, 4],
        [4, 7, 1, 5, 3, 0, 2, 8, 0],
        [7, 1, 5, 2, 0, 3, 0, 4, 0],
        [8, 4, 9, 6, 7, 5, 3, 2, 1],
        [3, 6, 2, 4, 1, 0, 0, 7, 5],
        [1, 2, 4, 9, 0, 0, 7, 5, 3],
        [5, 9, 3, 7, 4, 2, 1, 6, 8],
        [6, 8, 7, 3, 5, 1, 4, 9, 2],
    ],
];

/// A sudoku model posted into a space.
#[derive(Debug, Clone)]
pub struct Sudoku {
    grid: Matrix,
}

impl Sudoku {
    /// Branching used by the sudoku model for a given variable heuristic:
    /// always splitting at the midpoint.
    pub fn branching(var: VarSelection) -> BranchConfig {
        BranchConfig::new(var, ValSelection::SplitMin)
    }

    /// Creates 81 cells over `1..=9`, posts the distinct constraints and the
    /// givens of `board`, and registers `branching` over all cells.
    pub fn post(space: &mut Space, board: &Board, branching: BranchConfig) -> Result<Self> {
        if let Some(v) = board.iter().flatten().find(|&&v| v > 9) {
            return Err(CpError::InvalidModel(format!(
                "sudoku cell value {v} outside 0..=9"
            )));
        }
        let grid = Matrix::new(space.int_vars(81, 1, 9)?, 9, 9)?;

        for i in 0..9 {
            space.distinct(&grid.row(i))?;
            space.distinct(&grid.col(i))?;
        }
        for row in (0..9).step_by(3) {
            for col in (0..9).step_by(3) {
                space.distinct(&grid.slice(col, col + 3, row, row + 3))?;
            }
        }

        if let Err(failure) = Self::place_givens(space, &grid, board) {
            debug!(event = "root_failed", model = "sudoku", %failure);
        }

        space.branch(grid.cells(), branching)?;
        Ok(Self { grid })
    }

    /// Assigns the non-zero cells of `board`. A clash leaves `space` failed.
    fn place_givens(
        space: &mut Space,
        grid: &Matrix,
        board: &Board,
    ) -> std::result::Result<(), DomainFailure> {
        for (row, values) in board.iter().enumerate() {
            for (col, &v) in values.iter().enumerate() {
                if v != 0 {
                    space.assign(grid.get(col, row), i64::from(v))?;
                }
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> &Matrix {
        &self.grid
    }

    /// The filled board, if every cell is assigned.
    pub fn solution(&self, space: &Space) -> Option<Board> {
        let mut board = [[0u8; 9]; 9];
        for (row, line) in board.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                *cell = u8::try_from(space.val(self.grid.get(col, row))?).ok()?;
            }
        }
        Some(board)
    }
}

/// Pretty-printer for a board, with block separators.
#[derive(Debug, Clone, Copy)]
pub struct BoardDisplay<'a>(pub &'a Board);

impl fmt::Display for BoardDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.0.iter().enumerate() {
            if row > 0 && row % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for (col, &v) in line.iter().enumerate() {
                if col > 0 && col % 3 == 0 {
                    write!(f, "| ")?;
                }
                if v == 0 {
                    write!(f, ". ")?;
                } else {
                    write!(f, "{v} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
