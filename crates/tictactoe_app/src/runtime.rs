//! Composition root: builds the shared pieces once and hands them out.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tictactoe_core::{
    AutoMoverHandle, BoardStateManager, BoardView, ConsumerHandle, GameConfig, Move, MoveError,
    Position, Side, TaskQueue, ViewBridge, spawn_auto_mover,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Everything a running game needs, with explicit ownership of the
/// background threads.
pub struct GameRuntime {
    manager: Arc<BoardStateManager>,
    queue: Arc<TaskQueue>,
    bridge: ViewBridge,
    consumer: Option<ConsumerHandle>,
    mover: Option<AutoMoverHandle>,
    forwarder: Option<JoinHandle<usize>>,
}

impl GameRuntime {
    /// Starts the consumer thread, the view bridge and the timer.
    ///
    /// Must be called from within a tokio runtime. Returns the runtime and
    /// the receiver of rendered frames.
    #[instrument(skip_all, fields(tick_ms = *config.tick_interval_ms()))]
    pub fn start(config: &GameConfig) -> Result<(Self, mpsc::UnboundedReceiver<String>)> {
        let manager = Arc::new(BoardStateManager::new());
        let queue = Arc::new(TaskQueue::new());
        let view = Arc::new(Mutex::new(BoardView::new()));

        let consumer = queue
            .spawn_consumer(config.consumer_idle())
            .context("Failed to spawn task consumer thread")?;

        let (bridge, frames) = ViewBridge::new(Arc::clone(&queue), view);
        let forwarder = tokio::spawn(bridge.clone().run(manager.subscribe()));

        let mover = spawn_auto_mover(Arc::clone(&manager), config.tick_interval())
            .context("Failed to spawn automated mover thread")?;

        info!("Game runtime started");
        Ok((
            Self {
                manager,
                queue,
                bridge,
                consumer: Some(consumer),
                mover: Some(mover),
                forwarder: Some(forwarder),
            },
            frames,
        ))
    }

    /// The shared board.
    pub fn manager(&self) -> &Arc<BoardStateManager> {
        &self.manager
    }

    /// The view bridge, for messages and render requests.
    pub fn bridge(&self) -> &ViewBridge {
        &self.bridge
    }

    /// Submits a human move and shows the rejection reason, if any.
    #[instrument(skip(self))]
    pub fn submit(&self, position: Position) -> Result<(), MoveError> {
        let result = self.manager.submit_user_move(position);
        if let Err(e) = &result {
            self.bridge.post_message(Some(e.to_string()));
        }
        result
    }

    /// Stops the timer, then the bridge, then the consumer. Work already
    /// queued is drained before the consumer exits.
    #[instrument(skip(self))]
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(mover) = self.mover.take() {
            mover.stop();
        }
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
            if let Err(e) = forwarder.await
                && !e.is_cancelled()
            {
                warn!(error = %e, "View bridge failed");
            }
        }
        if let Some(consumer) = self.consumer.take() {
            tokio::task::spawn_blocking(move || consumer.stop())
                .await
                .context("Task consumer shutdown failed")?;
        }
        info!(pending = self.queue.pending_len(), "Game runtime stopped");
        Ok(())
    }
}

/// The scripted human's choice: the last free cell in row-major order.
pub fn scripted_choice(moves: &[Move]) -> Option<Position> {
    Position::ALL
        .into_iter()
        .rev()
        .find(|&pos| moves.binary_search(&Move::new(pos, Side::Human)).is_err())
}

/// Parses `<row> <col>`.
pub fn parse_position(line: &str) -> Option<Position> {
    let mut parts = line.split_whitespace();
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Position::new(row, col))
}
