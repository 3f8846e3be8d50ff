//! Ready-made models.
//!
//! Each model posts its variables, constraints and branching into a
//! caller-owned [`Space`](crate::space::Space) and keeps the handles needed
//! to read a solution back. Instance data (boards, sizes) is passed in;
//! nothing is global.

mod queens;
mod square;
mod sudoku;

pub use queens::Queens;
pub use square::{forbidden_border_gaps, Packing, Placed, SquarePacking};
pub use sudoku::{Board, BoardDisplay, Sudoku, BOARDS};
