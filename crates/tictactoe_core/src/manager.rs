//! The shared move store.
//!
//! [`BoardStateManager`] owns the move list, the turn gate and the round
//! tallies behind a single reader/writer lock. Every mutation runs its
//! legality check and its update under one write guard, and emits its
//! notifications before releasing it, so subscribers see events in the
//! same order the mutations happened.

use crate::events::{BoardEvent, EventBus, Scores};
use crate::policy::{FirstFreeCell, MoveSelectionPolicy, RoundOutcome};
use crate::rules::check_winner;
use crate::{Move, MoveError, Position, Side};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

/// Where the current round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Phase {
    /// The human may move.
    AwaitingHuman,
    /// The next timer tick moves for the automated side.
    AwaitingAutomated,
    /// No moves are accepted until the board is cleared.
    RoundOver,
}

/// Result of a successful automated turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatedMove {
    /// The policy picked a cell and it was stored.
    Placed(Move),
    /// No cell was available; the round was scored and the board cleared.
    RoundEnded(RoundOutcome),
}

/// Copy of the whole aggregate taken under one read guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Moves sorted by position.
    pub moves: Vec<Move>,
    /// Whether the human holds the turn.
    pub human_turn: bool,
    /// Round tallies.
    pub scores: Scores,
    /// Derived round phase.
    pub phase: Phase,
}

#[derive(Debug)]
struct BoardState {
    moves: Vec<Move>,
    human_turn: bool,
    round_over: bool,
    /// Side that completed a line first this round.
    first_line: Option<Side>,
    scores: Scores,
}

impl BoardState {
    fn new() -> Self {
        Self {
            moves: Vec::new(),
            human_turn: true,
            round_over: false,
            first_line: None,
            scores: Scores::default(),
        }
    }

    fn phase(&self) -> Phase {
        if self.round_over {
            Phase::RoundOver
        } else if self.human_turn {
            Phase::AwaitingHuman
        } else {
            Phase::AwaitingAutomated
        }
    }

    fn turn_side(&self) -> Side {
        if self.human_turn {
            Side::Human
        } else {
            Side::Automated
        }
    }

    /// Validates and inserts `mv` for the side holding the turn, then flips
    /// the turn. Leaves the state untouched on error.
    fn place(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.round_over {
            return Err(MoveError::RoundOver);
        }
        if mv.side() != self.turn_side() {
            return Err(MoveError::NotYourTurn);
        }
        if !mv.position().is_on_board() {
            return Err(MoveError::OutOfBounds);
        }
        let index = match self.moves.binary_search(&mv) {
            Ok(_) => return Err(MoveError::SquareTaken),
            Err(index) => index,
        };
        self.moves.insert(index, mv);
        self.human_turn = !self.human_turn;
        if self.first_line.is_none() {
            self.first_line = check_winner(&self.moves);
        }
        Ok(())
    }

    fn reset_board(&mut self) {
        self.moves.clear();
        self.first_line = None;
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            moves: self.moves.clone(),
            human_turn: self.human_turn,
            scores: self.scores,
            phase: self.phase(),
        }
    }
}

/// Single source of truth for board occupancy and turn order.
///
/// Share it as `Arc<BoardStateManager>` between the input side and the
/// timer thread. No method calls another locking method while it holds the
/// lock.
#[derive(Debug)]
pub struct BoardStateManager {
    state: RwLock<BoardState>,
    policy: Box<dyn MoveSelectionPolicy>,
    events: EventBus,
}

impl BoardStateManager {
    /// Creates a manager playing the automated side with [`FirstFreeCell`].
    #[instrument]
    pub fn new() -> Self {
        Self::with_policy(FirstFreeCell)
    }

    /// Creates a manager with a custom move-selection policy.
    #[instrument(skip(policy), fields(policy = ?policy))]
    pub fn with_policy(policy: impl MoveSelectionPolicy + 'static) -> Self {
        info!("Creating board state manager");
        Self {
            state: RwLock::new(BoardState::new()),
            policy: Box::new(policy),
            events: EventBus::new(),
        }
    }

    /// Registers for [`BoardEvent`]s.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Stores a move for the human.
    ///
    /// Rejects with [`MoveError::NotYourTurn`] on the automated side's turn,
    /// [`MoveError::OutOfBounds`] off the board and
    /// [`MoveError::SquareTaken`] on an occupied cell. On success the turn
    /// passes to the automated side and `MoveStored` is emitted.
    #[instrument(skip(self), fields(row = position.row(), col = position.col()))]
    pub fn submit_user_move(&self, position: Position) -> Result<(), MoveError> {
        let mv = Move::new(position, Side::Human);
        let mut state = self.state.write();

        if let Err(e) = state.place(mv) {
            warn!(error = %e, phase = %state.phase(), "Rejected user move");
            return Err(e);
        }

        info!(moves = state.moves.len(), "User move stored");
        self.events.emit(BoardEvent::MoveStored(mv));
        Ok(())
    }

    /// Plays the automated side's turn.
    ///
    /// Asks the policy for a position and stores it like any other move.
    /// When the policy has nothing to offer the round ends: it is scored,
    /// `ScoreUpdated` is emitted once, the board is cleared, the turn goes
    /// back to the human and the manager enters [`Phase::RoundOver`].
    #[instrument(skip(self))]
    pub fn apply_automated_move(&self) -> Result<AutomatedMove, MoveError> {
        let mut state = self.state.write();

        if state.round_over {
            return Err(MoveError::RoundOver);
        }
        if state.human_turn {
            debug!("Automated move requested on the human's turn");
            return Err(MoveError::NotYourTurn);
        }

        let Some(position) = self.policy.select(&state.moves) else {
            let outcome = self.policy.adjudicate(&state.moves, state.first_line);
            state.scores.record(outcome);
            state.reset_board();
            state.human_turn = true;
            state.round_over = true;
            info!(%outcome, scores = %state.scores, "Round over");
            self.events.emit(BoardEvent::ScoreUpdated(state.scores));
            self.events.emit(BoardEvent::BoardCleared);
            return Ok(AutomatedMove::RoundEnded(outcome));
        };

        let mv = Move::new(position, Side::Automated);
        if let Err(e) = state.place(mv) {
            warn!(error = %e, %position, "Policy chose an illegal move");
            return Err(e);
        }

        info!(%position, moves = state.moves.len(), "Automated move stored");
        self.events.emit(BoardEvent::MoveStored(mv));
        Ok(AutomatedMove::Placed(mv))
    }

    /// Timer entry point: plays the automated turn if it is due.
    ///
    /// Returns `None` without touching the board on the human's turn or
    /// while the round is over.
    pub fn tick(&self) -> Option<AutomatedMove> {
        if self.phase() != Phase::AwaitingAutomated {
            trace!("Tick skipped");
            return None;
        }
        // The turn may have changed since the read above; the write path
        // checks again.
        self.apply_automated_move().ok()
    }

    /// Copy of the current moves, sorted by position.
    #[instrument(skip(self))]
    pub fn get_all_current_moves(&self) -> Vec<Move> {
        self.state.read().moves.clone()
    }

    /// Removes every move and leaves [`Phase::RoundOver`].
    ///
    /// The turn gate is left alone. After a round ends it already points at
    /// the human.
    #[instrument(skip(self))]
    pub fn clear_game(&self) {
        let mut state = self.state.write();
        state.reset_board();
        state.round_over = false;
        info!(phase = %state.phase(), "Board cleared");
        self.events.emit(BoardEvent::BoardCleared);
    }

    /// Clears the board, resets the tallies and gives the human the turn.
    #[instrument(skip(self))]
    pub fn new_game(&self) {
        let mut state = self.state.write();
        *state = BoardState::new();
        info!("New game");
        self.events.emit(BoardEvent::BoardCleared);
        self.events.emit(BoardEvent::ScoreUpdated(state.scores));
    }

    /// Whether the human holds the turn.
    pub fn is_human_turn(&self) -> bool {
        self.state.read().human_turn
    }

    /// Current tallies.
    pub fn scores(&self) -> Scores {
        self.state.read().scores
    }

    /// Current round phase.
    pub fn phase(&self) -> Phase {
        self.state.read().phase()
    }

    /// Moves, turn, tallies and phase read together.
    #[instrument(skip(self))]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.state.read().snapshot()
    }
}

impl Default for BoardStateManager {
    fn default() -> Self {
        Self::new()
    }
}
