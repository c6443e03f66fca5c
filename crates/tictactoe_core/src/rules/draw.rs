//! Full-board and draw detection.

use super::win::check_winner;
use crate::{CELL_COUNT, Move};
use tracing::instrument;

/// Checks whether every cell is occupied.
#[instrument(skip(moves), fields(moves = moves.len()))]
pub fn is_full(moves: &[Move]) -> bool {
    moves.len() >= CELL_COUNT
}

/// A full board with no three-in-a-row.
#[instrument(skip(moves), fields(moves = moves.len()))]
pub fn is_draw(moves: &[Move]) -> bool {
    is_full(moves) && check_winner(moves).is_none()
}
