//! Round rules for tic-tac-toe.
//!
//! Pure functions over a move list. They never touch shared state, so the
//! board manager can call them while it holds its lock.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{check_winner, occupancy};
