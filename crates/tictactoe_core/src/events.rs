//! Board change notifications.

use crate::{Move, RoundOutcome};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace};

/// Round tallies. Counters only grow until a new game resets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Rounds won by the human.
    pub human_wins: u32,
    /// Rounds won by the automated side.
    pub automated_wins: u32,
    /// Rounds with no winner.
    pub draws: u32,
}

impl Scores {
    /// Counts one finished round.
    pub fn record(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::HumanWin => self.human_wins += 1,
            RoundOutcome::AutomatedWin => self.automated_wins += 1,
            RoundOutcome::Draw => self.draws += 1,
        }
    }

    /// Total rounds played.
    pub fn rounds(&self) -> u32 {
        self.human_wins + self.automated_wins + self.draws
    }
}

impl std::fmt::Display for Scores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player: {} AI: {} Cat: {}",
            self.human_wins, self.automated_wins, self.draws
        )
    }
}

/// A change to the board, delivered to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A move was applied.
    MoveStored(Move),
    /// All moves were removed.
    BoardCleared,
    /// A round ended or the tallies were reset.
    ScoreUpdated(Scores),
}

/// Fan-out list of event subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<BoardEvent>>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    #[instrument(skip(self))]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BoardEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = self.subscribers.lock();
        subscribers.push(tx);
        debug!(count = subscribers.len(), "Subscriber registered");
        rx
    }

    /// Sends `event` to every live subscriber, dropping closed ones.
    pub fn emit(&self, event: BoardEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!(?event, live = subscribers.len(), "Event emitted");
    }

    /// Number of live subscribers as of the last emit.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Side};

    #[test]
    fn test_every_subscriber_receives() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(BoardEvent::BoardCleared);

        assert_eq!(a.try_recv().ok(), Some(BoardEvent::BoardCleared));
        assert_eq!(b.try_recv().ok(), Some(BoardEvent::BoardCleared));
    }

    #[test]
    fn test_closed_subscribers_are_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let _keep = bus.subscribe();
        drop(rx);

        bus.emit(BoardEvent::MoveStored(Move::new(Position::new(0, 0), Side::Human)));

        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_scores_display() {
        let mut scores = Scores::default();
        scores.record(RoundOutcome::Draw);
        scores.record(RoundOutcome::HumanWin);
        assert_eq!(scores.to_string(), "Player: 1 AI: 0 Cat: 1");
        assert_eq!(scores.rounds(), 2);
    }
}
