//! Consumer-side mirror of the board.
//!
//! The render side keeps its own copy of the moves and tallies, fed by
//! [`BoardEvent`]s. [`ViewBridge`] defers every update onto the
//! [`TaskQueue`], so the mirror only changes on the consumer thread, and
//! publishes a freshly rendered frame after each one.

use crate::events::{BoardEvent, Scores};
use crate::rules::occupancy;
use crate::{BOARD_SIZE, Move, TaskQueue};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Text rendering of the board plus the stats line and last user message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    moves: Vec<Move>,
    scores: Scores,
    message: Option<String>,
}

impl BoardView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the mirror. A stored human move clears the
    /// user message.
    pub fn apply(&mut self, event: &BoardEvent) {
        match event {
            BoardEvent::MoveStored(mv) => {
                if let Err(index) = self.moves.binary_search(mv) {
                    self.moves.insert(index, *mv);
                }
                if mv.made_by_human() {
                    self.message = None;
                }
            }
            BoardEvent::BoardCleared => self.moves.clear(),
            BoardEvent::ScoreUpdated(scores) => self.scores = *scores,
        }
    }

    /// Sets or clears the message shown under the board.
    pub fn set_message(&mut self, message: Option<String>) {
        self.message = message;
    }

    /// Mirrored moves.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Mirrored tallies.
    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Renders the grid (`X` human, `O` automated, `.` empty), the stats
    /// line and the message, if any.
    pub fn render(&self) -> String {
        let grid = occupancy(&self.moves);
        let mut out = String::new();
        for row in grid.chunks(usize::from(BOARD_SIZE)) {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or('.', |side| side.mark()).to_string())
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out.push_str(&self.scores.to_string());
        if let Some(message) = &self.message {
            out.push('\n');
            out.push_str(message);
        }
        out
    }
}

/// Routes view updates through the task queue.
///
/// Every update runs on the consumer thread and is followed by a render
/// sent to the frame channel, so frames arrive in update order.
#[derive(Debug, Clone)]
pub struct ViewBridge {
    queue: Arc<TaskQueue>,
    view: Arc<Mutex<BoardView>>,
    frames: mpsc::UnboundedSender<String>,
}

impl ViewBridge {
    /// Creates a bridge and the receiver its frames go to.
    pub fn new(
        queue: Arc<TaskQueue>,
        view: Arc<Mutex<BoardView>>,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (frames, rx) = mpsc::unbounded_channel();
        (Self { queue, view, frames }, rx)
    }

    /// Defers `update` onto the consumer, then renders.
    fn defer(&self, update: impl FnOnce(&mut BoardView) + Send + Sync + 'static) {
        let view = Arc::clone(&self.view);
        let frames = self.frames.clone();
        self.queue.submit(move || {
            let mut view = view.lock();
            update(&mut *view);
            // Nobody listening is fine.
            let _ = frames.send(view.render());
        });
    }

    /// Defers one board event.
    pub fn post(&self, event: BoardEvent) {
        self.defer(move |view| view.apply(&event));
    }

    /// Defers a change of the user message.
    pub fn post_message(&self, message: Option<String>) {
        self.defer(move |view| view.set_message(message));
    }

    /// Requests a frame without changing the view.
    pub fn post_render(&self) {
        self.defer(|_| {});
    }

    /// Forwards `events` until the channel closes. Returns the number of
    /// events forwarded.
    #[instrument(skip_all)]
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<BoardEvent>) -> usize {
        info!("View bridge started");
        let mut forwarded = 0;
        while let Some(event) = events.recv().await {
            debug!(?event, "Deferring view update");
            self.post(event);
            forwarded += 1;
        }
        info!(forwarded, "View bridge finished");
        forwarded
    }
}
