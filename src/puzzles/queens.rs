//! N-queens on a 0/1 board.

use crate::branch::{BranchConfig, ValSelection, VarSelection};
use crate::error::{CpError, Result};
use crate::propagators::Relation;
use crate::space::Space;
use crate::var::Matrix;

/// An `n × n` board of 0/1 cells, 1 marking a queen.
///
/// Every row and column sums to exactly 1; every diagonal (both
/// directions) sums to at most 1.
///
/// # Examples
///
/// ```
/// use u_cpsolve::puzzles::Queens;
/// use u_cpsolve::search::{SearchConfig, SearchRunner};
/// use u_cpsolve::space::Space;
///
/// let mut space = Space::new();
/// let queens = Queens::post(&mut space, 4, Queens::BRANCHING).unwrap();
/// let result = SearchRunner::run(space, &SearchConfig::default()).unwrap();
///
/// assert_eq!(result.solutions.len(), 2);
/// assert_eq!(queens.columns(&result.solutions[0]), Some(vec![1, 3, 0, 2]));
/// ```
#[derive(Debug, Clone)]
pub struct Queens {
    n: usize,
    board: Matrix,
}

impl Queens {
    /// Largest domain first, trying a queen before an empty cell.
    pub const BRANCHING: BranchConfig = BranchConfig {
        var: VarSelection::SizeMax,
        val: ValSelection::Max,
        seed: None,
    };

    /// Creates the board in `space`, posts its constraints and registers
    /// `branching` over all cells.
    pub fn post(space: &mut Space, n: usize, branching: BranchConfig) -> Result<Self> {
        if n == 0 {
            return Err(CpError::InvalidModel("queens needs n >= 1".into()));
        }
        let board = Matrix::new(space.int_vars(n * n, 0, 1)?, n, n)?;

        for i in 0..n {
            space.sum(&board.row(i), Relation::Eq, 1)?;
            space.sum(&board.col(i), Relation::Eq, 1)?;
        }

        let n_i = n as i64;
        for d in -(n_i - 1)..n_i {
            let col0 = d.max(0) as usize;
            let row0 = (-d).max(0) as usize;
            let len = n - d.unsigned_abs() as usize;
            if len < 2 {
                continue;
            }
            let down: Vec<_> = (0..len).map(|k| board.get(col0 + k, row0 + k)).collect();
            let up: Vec<_> = (0..len)
                .map(|k| board.get(col0 + k, n - 1 - (row0 + k)))
                .collect();
            space.sum(&down, Relation::Le, 1)?;
            space.sum(&up, Relation::Le, 1)?;
        }

        space.branch(board.cells(), branching)?;
        Ok(Self { n, board })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn board(&self) -> &Matrix {
        &self.board
    }

    /// Column of the queen in each row, if the board is fully assigned.
    pub fn columns(&self, space: &Space) -> Option<Vec<usize>> {
        (0..self.n)
            .map(|row| {
                let cells = self.board.row(row);
                let values = space.values(&cells)?;
                values.iter().position(|&v| v == 1)
            })
            .collect()
    }

    /// The board as text, `Q` for a queen, `.` for an empty cell and `?`
    /// for an undecided one.
    pub fn render(&self, space: &Space) -> String {
        let mut out = String::with_capacity(self.n * (self.n + 1));
        for row in 0..self.n {
            for col in 0..self.n {
                out.push(match space.val(self.board.get(col, row)) {
                    Some(1) => 'Q',
                    Some(_) => '.',
                    None => '?',
                });
            }
            out.push('\n');
        }
        out
    }
}
