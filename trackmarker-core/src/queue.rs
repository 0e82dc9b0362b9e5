//! The action queue: a FIFO mailbox from any thread onto the clock-owning
//! thread.
//!
//! Senders never block and get no result back. The receiving side drains
//! with a snapshot bound: `drain_once` executes at most the number of items
//! that were queued when the drain began, so an action that enqueues further
//! actions cannot extend the current drain. Follow-ups run on the next one.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Create a connected sender/queue pair.
pub fn action_queue<T>() -> (ActionSender<T>, ActionQueue<T>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ActionSender { tx }, ActionQueue { rx })
}

/// Clonable enqueue handle, safe to use from any thread.
pub struct ActionSender<T> {
    tx: Sender<T>,
}

impl<T> Clone for ActionSender<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T> ActionSender<T> {
    /// Enqueue an action. Fire-and-forget: if the receiving side is gone
    /// the action is dropped with a warning.
    pub fn send(&self, action: T) {
        if self.tx.send(action).is_err() {
            log::warn!(target: "queue", "action dropped: engine disconnected");
        }
    }
}

/// Receiving half, owned by the clock-owning thread.
pub struct ActionQueue<T> {
    rx: Receiver<T>,
}

impl<T> ActionQueue<T> {
    /// Execute every action queued at the time of the call, in FIFO order,
    /// on the calling thread. Returns the number executed.
    pub fn drain_once<F: FnMut(T)>(&self, mut apply: F) -> usize {
        let pending = self.rx.len();
        let mut ran = 0;
        for _ in 0..pending {
            match self.rx.try_recv() {
                Ok(action) => {
                    apply(action);
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        ran
    }
}
