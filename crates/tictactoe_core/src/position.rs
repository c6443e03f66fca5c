//! Board cell addresses.

use serde::{Deserialize, Serialize};

/// Number of rows and columns on the board.
pub const BOARD_SIZE: u8 = 3;

/// Number of cells on the board.
pub const CELL_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// A (row, column) cell address on the 3x3 board.
///
/// Positions compare row-major: top-to-bottom, then left-to-right. The
/// derived ordering relies on `row` being declared before `col`.
///
/// Construction is unchecked so that raw input can be carried to the board
/// manager, which rejects anything off the board with
/// [`MoveError::OutOfBounds`](crate::MoveError::OutOfBounds).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Every on-board position in ascending (row-major) order.
    pub const ALL: [Position; CELL_COUNT] = [
        Position::new(0, 0),
        Position::new(0, 1),
        Position::new(0, 2),
        Position::new(1, 0),
        Position::new(1, 1),
        Position::new(1, 2),
        Position::new(2, 0),
        Position::new(2, 1),
        Position::new(2, 2),
    ];

    /// Creates a position. Range is not checked here.
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row, counted from the top.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column, counted from the left.
    pub fn col(self) -> u8 {
        self.col
    }

    /// Returns true if both axes lie in `0..BOARD_SIZE`.
    pub fn is_on_board(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Converts to a row-major cell index (0-8), if on the board.
    pub fn to_index(self) -> Option<usize> {
        self.is_on_board()
            .then(|| usize::from(self.row) * usize::from(BOARD_SIZE) + usize::from(self.col))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
