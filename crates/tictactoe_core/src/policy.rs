//! Move selection for the automated side.

use crate::rules::is_draw;
use crate::{Move, Position, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// How a finished round is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum RoundOutcome {
    /// The human completed a line first.
    HumanWin,
    /// The automated side completed a line first.
    AutomatedWin,
    /// Nobody completed a line.
    Draw,
}

impl From<Option<Side>> for RoundOutcome {
    fn from(winner: Option<Side>) -> Self {
        match winner {
            Some(Side::Human) => RoundOutcome::HumanWin,
            Some(Side::Automated) => RoundOutcome::AutomatedWin,
            None => RoundOutcome::Draw,
        }
    }
}

/// Pluggable strategy for the automated side.
///
/// Both methods receive the current moves sorted by position with no
/// duplicates. They are called with the board manager's write lock held and
/// must not call back into the manager.
pub trait MoveSelectionPolicy: Send + Sync + std::fmt::Debug {
    /// Picks the next position, or `None` when no move is available.
    fn select(&self, moves: &[Move]) -> Option<Position>;

    /// Scores a round that has run out of moves.
    ///
    /// `first_line` is the side that completed a line first during the
    /// round, if any. Both sides may hold a line by the time the board is
    /// full, so it cannot be recovered from `moves` alone.
    fn adjudicate(&self, moves: &[Move], first_line: Option<Side>) -> RoundOutcome {
        if first_line.is_none() && !is_draw(moves) {
            debug!(moves = moves.len(), "Round ended before the board filled");
        }
        first_line.into()
    }
}

/// Takes the first free cell in row-major order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFreeCell;

impl MoveSelectionPolicy for FirstFreeCell {
    #[instrument(skip(self, moves), fields(moves = moves.len()))]
    fn select(&self, moves: &[Move]) -> Option<Position> {
        let choice = Position::ALL.into_iter().find(|&pos| {
            // Side does not take part in the comparison.
            moves.binary_search(&Move::new(pos, Side::Automated)).is_err()
        });
        debug!(?choice, "Selected automated move");
        choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_takes_top_left() {
        assert_eq!(FirstFreeCell.select(&[]), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_skips_cells_held_by_either_side() {
        let moves = [
            Move::new(Position::new(0, 0), Side::Automated),
            Move::new(Position::new(0, 1), Side::Human),
        ];
        assert_eq!(FirstFreeCell.select(&moves), Some(Position::new(0, 2)));
    }

    #[test]
    fn test_full_board_has_no_candidate() {
        let moves: Vec<_> = Position::ALL
            .iter()
            .map(|&p| Move::new(p, Side::Human))
            .collect();
        assert_eq!(FirstFreeCell.select(&moves), None);
    }

    #[test]
    fn test_adjudicate_scores_first_line() {
        let moves = [
            Move::new(Position::new(0, 0), Side::Human),
            Move::new(Position::new(1, 1), Side::Human),
            Move::new(Position::new(2, 2), Side::Human),
        ];
        assert_eq!(
            FirstFreeCell.adjudicate(&moves, Some(Side::Human)),
            RoundOutcome::HumanWin
        );
        assert_eq!(FirstFreeCell.adjudicate(&[], None), RoundOutcome::Draw);
    }

    #[test]
    fn test_adjudicate_credits_first_line_when_both_hold_one() {
        // O O O / O X X / X X X: both sides hold a row, the human finished first.
        let human = [(1, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
        let moves: Vec<_> = Position::ALL
            .iter()
            .map(|&p| {
                let side = if human.contains(&(p.row(), p.col())) {
                    Side::Human
                } else {
                    Side::Automated
                };
                Move::new(p, side)
            })
            .collect();
        assert_eq!(
            FirstFreeCell.adjudicate(&moves, Some(Side::Human)),
            RoundOutcome::HumanWin
        );
    }
}
