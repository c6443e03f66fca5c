//! Win detection.

use crate::{CELL_COUNT, Move, Position, Side};
use tracing::instrument;

const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)],
    [Position::new(1, 0), Position::new(1, 1), Position::new(1, 2)],
    [Position::new(2, 0), Position::new(2, 1), Position::new(2, 2)],
    // Columns
    [Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
    [Position::new(0, 1), Position::new(1, 1), Position::new(2, 1)],
    [Position::new(0, 2), Position::new(1, 2), Position::new(2, 2)],
    // Diagonals
    [Position::new(0, 0), Position::new(1, 1), Position::new(2, 2)],
    [Position::new(0, 2), Position::new(1, 1), Position::new(2, 0)],
];

/// Lays a move list out as a row-major grid of owners.
///
/// Off-board moves are ignored.
pub fn occupancy(moves: &[Move]) -> [Option<Side>; CELL_COUNT] {
    let mut grid = [None; CELL_COUNT];
    for mv in moves {
        if let Some(index) = mv.position().to_index() {
            grid[index] = Some(mv.side());
        }
    }
    grid
}

/// Returns the side holding three in a row, if any.
#[instrument(skip(moves), fields(moves = moves.len()))]
pub fn check_winner(moves: &[Move]) -> Option<Side> {
    let grid = occupancy(moves);
    let owner = |pos: Position| pos.to_index().and_then(|i| grid[i]);

    LINES.iter().find_map(|[a, b, c]| {
        let side = owner(*a)?;
        (owner(*b) == Some(side) && owner(*c) == Some(side)).then_some(side)
    })
}
