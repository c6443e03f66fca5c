//! Timer thread that plays the automated side.

use crate::BoardStateManager;
use crossbeam_channel::{Sender, bounded, select, tick};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Starts a thread calling [`BoardStateManager::tick`] every `interval`.
#[instrument(skip(manager))]
pub fn spawn_auto_mover(
    manager: Arc<BoardStateManager>,
    interval: Duration,
) -> std::io::Result<AutoMoverHandle> {
    let (stop_tx, stop_rx) = bounded::<()>(0);
    let join = thread::Builder::new()
        .name("auto-mover".to_string())
        .spawn(move || {
            info!(?interval, "Automated mover started");
            let ticker = tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        if let Some(outcome) = manager.tick() {
                            debug!(?outcome, "Automated turn played");
                        }
                    }
                    // Closed when the handle is stopped or dropped.
                    recv(stop_rx) -> _ => break,
                }
            }
            info!("Automated mover stopped");
        })?;

    Ok(AutoMoverHandle {
        stop_tx: Some(stop_tx),
        join: Some(join),
    })
}

/// Owner of the timer thread. Stops it on drop.
#[derive(Debug)]
pub struct AutoMoverHandle {
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl AutoMoverHandle {
    /// Stops the timer and waits for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop_tx.take());
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            error!("Automated mover thread panicked");
        }
    }
}

impl Drop for AutoMoverHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
