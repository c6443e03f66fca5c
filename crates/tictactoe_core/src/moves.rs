//! Moves and move errors.
//!
//! A move is one side occupying one position. Moves compare by position
//! only, which is what lets a sorted move list answer "is this square
//! taken?" with a binary search regardless of who holds the square.

use super::Position;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which side made a move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Side {
    /// The person at the input device. Moves first in every round.
    Human,
    /// The timer-driven opponent.
    Automated,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Human => Side::Automated,
            Side::Automated => Side::Human,
        }
    }

    /// Board glyph for this side.
    pub fn mark(self) -> char {
        match self {
            Side::Human => 'X',
            Side::Automated => 'O',
        }
    }
}

/// An applied occupation of one position by one side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    position: Position,
    side: Side,
}

impl Move {
    /// The occupied position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// The side holding the position.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns true if the human made this move.
    pub fn made_by_human(&self) -> bool {
        self.side == Side::Human
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Move {}

impl PartialOrd for Move {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Move {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position.cmp(&other.position)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.side, self.position)
    }
}

/// Reasons a move is rejected. State is unchanged whenever one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The move was submitted on the other side's turn.
    #[display("Not your turn!")]
    NotYourTurn,

    /// A coordinate lies outside `0..=2`.
    #[display("Not a valid move!")]
    OutOfBounds,

    /// Some earlier move, by either side, already holds the position.
    #[display("Square already taken, pick again!")]
    SquareTaken,

    /// The round has ended and the board must be cleared first.
    #[display("Round is over, clear the board to keep playing!")]
    RoundOver,
}

impl std::error::Error for MoveError {}
