//! Tests for forwarding board events onto the consumer thread.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tictactoe_core::{BoardStateManager, BoardView, Position, TaskQueue, ViewBridge};

#[tokio::test]
async fn test_bridge_mirrors_board_on_consumer() {
    let manager = BoardStateManager::new();
    let queue = Arc::new(TaskQueue::new());
    let view = Arc::new(Mutex::new(BoardView::new()));
    let consumer = queue.spawn_consumer(Duration::from_millis(1)).unwrap();

    let (bridge, mut frames) = ViewBridge::new(Arc::clone(&queue), Arc::clone(&view));
    let forwarder = tokio::spawn(bridge.clone().run(manager.subscribe()));

    manager.submit_user_move(Position::new(1, 1)).unwrap();
    manager.apply_automated_move().unwrap();
    manager.submit_user_move(Position::new(2, 2)).unwrap();
    let expected = manager.get_all_current_moves();

    // Dropping the manager closes the event channel and ends the forwarder.
    drop(manager);
    assert_eq!(forwarder.await.unwrap(), 3);

    let mut last = None;
    for _ in 0..3 {
        last = Some(frames.recv().await.unwrap());
    }
    assert_eq!(last.unwrap(), "O . .\n. X .\n. . X\nPlayer: 0 AI: 0 Cat: 0");
    assert_eq!(view.lock().moves(), expected.as_slice());

    consumer.stop();
}

#[tokio::test]
async fn test_bridge_tracks_clear_and_new_game() {
    let manager = BoardStateManager::new();
    let queue = Arc::new(TaskQueue::new());
    let view = Arc::new(Mutex::new(BoardView::new()));
    let (bridge, mut frames) = ViewBridge::new(Arc::clone(&queue), Arc::clone(&view));
    let forwarder = tokio::spawn(bridge.run(manager.subscribe()));

    manager.submit_user_move(Position::new(0, 2)).unwrap();
    manager.clear_game();
    manager.new_game();
    drop(manager);
    assert_eq!(forwarder.await.unwrap(), 4);

    // No consumer thread here: drain by hand.
    assert_eq!(queue.process_pending(), 4);
    let view = view.lock();
    assert!(view.moves().is_empty());
    assert_eq!(view.scores().rounds(), 0);

    let rendered: Vec<String> = std::iter::from_fn(|| frames.try_recv().ok()).collect();
    assert_eq!(rendered.len(), 4);
    assert!(rendered[0].starts_with(". . X"));
}

#[test]
fn test_blocking_render_sees_prior_posts() {
    let queue = Arc::new(TaskQueue::new());
    let view = Arc::new(Mutex::new(BoardView::new()));
    let consumer = queue.spawn_consumer(Duration::from_millis(1)).unwrap();
    let (bridge, mut frames) = ViewBridge::new(Arc::clone(&queue), Arc::clone(&view));

    bridge.post_message(Some("Not your turn!".to_string()));
    bridge.post_render();
    queue.submit_blocking(|| {});

    assert!(frames.try_recv().unwrap().ends_with("Not your turn!"));
    assert!(frames.try_recv().unwrap().ends_with("Not your turn!"));
    consumer.stop();
}
