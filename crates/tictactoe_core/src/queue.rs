//! Cross-thread task queue.
//!
//! Any number of producer threads post closures; exactly one consumer
//! thread drains and runs them. Draining is batch-wise: the consumer takes
//! everything pending in one step, lets go of the lock, then runs the batch
//! in submission order. Tasks may therefore submit further tasks, blocking
//! ones included, without deadlocking the queue.

use parking_lot::{Condvar, Mutex, RwLock};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace};

type Work = Box<dyn FnOnce() + Send + Sync + 'static>;

/// A deferred unit of work.
///
/// Closures must be `Sync` because the pending list is read from producer
/// threads through a shared lock.
pub struct Task {
    work: Work,
}

impl Task {
    /// Wraps a closure.
    pub fn new(work: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            work: Box::new(work),
        }
    }

    /// Runs the task, catching a panic so the rest of the batch still runs.
    /// Returns false if the task panicked.
    fn run(self) -> bool {
        match catch_unwind(AssertUnwindSafe(self.work)) {
            Ok(()) => true,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(%message, "Task panicked");
                false
            }
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Pending {
    tasks: Vec<Task>,
    /// Blocking submitters waiting on the batch currently pending.
    waiters: usize,
    /// Number of batches the consumer has taken so far.
    batches_taken: u64,
}

/// Mailbox of deferred work drained by a single consumer thread.
///
/// Calling [`TaskQueue::submit_blocking`] from the consumer thread itself
/// deadlocks; that is the caller's responsibility.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: RwLock<Pending>,
    /// Highest batch id whose execution finished while someone was waiting.
    completed: Mutex<u64>,
    batch_done: Condvar,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `work` and returns immediately.
    pub fn submit(&self, work: impl FnOnce() + Send + Sync + 'static) {
        self.submit_task(Task::new(work));
    }

    /// Queues an already boxed task and returns immediately.
    pub fn submit_task(&self, task: Task) {
        let mut pending = self.pending.write();
        pending.tasks.push(task);
        trace!(pending = pending.tasks.len(), "Task submitted");
    }

    /// Queues `work` and blocks until the batch containing it has run.
    ///
    /// There is no timeout: if the consumer never drains again, this never
    /// returns.
    #[instrument(skip_all)]
    pub fn submit_blocking(&self, work: impl FnOnce() + Send + Sync + 'static) {
        let ticket = {
            let mut pending = self.pending.write();
            pending.tasks.push(Task::new(work));
            pending.waiters += 1;
            pending.batches_taken + 1
        };
        debug!(ticket, "Waiting for batch");

        let mut completed = self.completed.lock();
        while *completed < ticket {
            self.batch_done.wait(&mut completed);
        }
        debug!(ticket, "Batch complete");
    }

    /// Number of tasks not yet taken by the consumer.
    pub fn pending_len(&self) -> usize {
        self.pending.read().tasks.len()
    }

    /// One scheduling tick of the consumer: takes every pending task and
    /// runs them in order. Returns how many tasks ran.
    pub fn process_pending(&self) -> usize {
        // Idle ticks only take the shared lock.
        if self.pending.read().tasks.is_empty() {
            return 0;
        }

        let (batch, batch_id, had_waiters) = {
            let mut pending = self.pending.write();
            pending.batches_taken += 1;
            (
                std::mem::take(&mut pending.tasks),
                pending.batches_taken,
                std::mem::take(&mut pending.waiters) > 0,
            )
        };

        let batch_len = batch.len();
        let failed = batch.into_iter().map(Task::run).filter(|ok| !ok).count();
        debug!(batch_id, batch_len, failed, had_waiters, "Batch executed");

        if had_waiters {
            let mut completed = self.completed.lock();
            *completed = batch_id;
            self.batch_done.notify_all();
        }
        batch_len
    }

    /// Consumer loop. Runs ticks until `done` is set, then drains once more
    /// so nothing submitted before the stop is lost.
    #[instrument(skip(self, done))]
    pub fn run(&self, done: &AtomicBool, idle: Duration) {
        info!("Task consumer started");
        while !done.load(Ordering::Acquire) {
            if self.process_pending() == 0 {
                if idle.is_zero() {
                    thread::yield_now();
                } else {
                    thread::sleep(idle);
                }
            }
        }
        let drained = self.process_pending();
        info!(drained, "Task consumer stopped");
    }

    /// Starts the consumer loop on a dedicated thread.
    #[instrument(skip(self))]
    pub fn spawn_consumer(self: &Arc<Self>, idle: Duration) -> std::io::Result<ConsumerHandle> {
        let done = Arc::new(AtomicBool::new(false));
        let queue = Arc::clone(self);
        let flag = Arc::clone(&done);
        let join = thread::Builder::new()
            .name("task-consumer".to_string())
            .spawn(move || queue.run(&flag, idle))?;
        Ok(ConsumerHandle {
            done,
            join: Some(join),
        })
    }
}

/// Owner of a running consumer thread. Stops it on drop.
#[derive(Debug)]
pub struct ConsumerHandle {
    done: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ConsumerHandle {
    /// The consumer thread's id.
    pub fn thread_id(&self) -> Option<thread::ThreadId> {
        self.join.as_ref().map(|j| j.thread().id())
    }

    /// Sets the done flag and waits for the loop to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.done.store(true, Ordering::Release);
        if let Some(join) = self.join.take()
            && join.join().is_err()
        {
            error!("Task consumer thread panicked");
        }
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
