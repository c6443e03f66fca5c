//! Tests for the timer-driven automated mover.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tictactoe_core::{BoardEvent, BoardStateManager, Phase, Position, Side, spawn_auto_mover};
use tokio::sync::mpsc::UnboundedReceiver;

fn recv_within(rx: &mut UnboundedReceiver<BoardEvent>, limit: Duration) -> Option<BoardEvent> {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Ok(event) = rx.try_recv() {
            return Some(event);
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    None
}

#[test]
fn test_timer_plays_after_human() {
    let manager = Arc::new(BoardStateManager::new());
    let mut rx = manager.subscribe();
    let mover = spawn_auto_mover(Arc::clone(&manager), Duration::from_millis(10)).unwrap();

    manager.submit_user_move(Position::new(1, 1)).unwrap();
    let first = recv_within(&mut rx, Duration::from_secs(5)).unwrap();
    assert!(matches!(first, BoardEvent::MoveStored(mv) if mv.side() == Side::Human));

    let second = recv_within(&mut rx, Duration::from_secs(5)).unwrap();
    match second {
        BoardEvent::MoveStored(mv) => {
            assert_eq!(mv.side(), Side::Automated);
            assert_eq!(mv.position(), Position::new(0, 0));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(manager.is_human_turn());

    mover.stop();
}

#[test]
fn test_timer_idles_on_human_turn() {
    let manager = Arc::new(BoardStateManager::new());
    let mut rx = manager.subscribe();
    let mover = spawn_auto_mover(Arc::clone(&manager), Duration::from_millis(5)).unwrap();

    assert!(recv_within(&mut rx, Duration::from_millis(100)).is_none());
    assert_eq!(manager.phase(), Phase::AwaitingHuman);

    drop(mover);
}

#[test]
fn test_stopped_timer_no_longer_moves() {
    let manager = Arc::new(BoardStateManager::new());
    let mover = spawn_auto_mover(Arc::clone(&manager), Duration::from_millis(5)).unwrap();
    mover.stop();

    manager.submit_user_move(Position::new(2, 2)).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(manager.phase(), Phase::AwaitingAutomated);
    assert_eq!(manager.get_all_current_moves().len(), 1);
}
