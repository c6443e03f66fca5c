//! Tic-tac-toe concurrency core.
//!
//! Two cooperating pieces bind an input thread to a consumer thread:
//!
//! - **TaskQueue**: closures posted from any thread, drained batch-wise and
//!   run in order on one consumer thread, with fire-and-forget and
//!   submit-and-wait entry points.
//! - **BoardStateManager**: the turn-gated move store. Moves stay sorted
//!   and duplicate-free under concurrent access, and a timer thread plays
//!   the automated side through a pluggable policy.
//!
//! The two never reference each other. The application wires them together,
//! usually by forwarding board events onto the queue with
//! [`ViewBridge`].
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{BoardStateManager, MoveError, Position};
//!
//! let manager = BoardStateManager::new();
//! manager.submit_user_move(Position::new(1, 1)).unwrap();
//! assert_eq!(
//!     manager.submit_user_move(Position::new(0, 0)),
//!     Err(MoveError::NotYourTurn)
//! );
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auto_mover;
mod config;
mod events;
mod manager;
mod moves;
mod policy;
mod position;
mod queue;
pub mod rules;
mod view;

pub use auto_mover::{AutoMoverHandle, spawn_auto_mover};
pub use config::{ConfigError, GameConfig};
pub use events::{BoardEvent, EventBus, Scores};
pub use manager::{AutomatedMove, BoardSnapshot, BoardStateManager, Phase};
pub use moves::{Move, MoveError, Side};
pub use policy::{FirstFreeCell, MoveSelectionPolicy, RoundOutcome};
pub use position::{BOARD_SIZE, CELL_COUNT, Position};
pub use queue::{ConsumerHandle, Task, TaskQueue};
pub use view::{BoardView, ViewBridge};
