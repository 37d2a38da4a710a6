//! Host lifecycle events and subscription guards.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const HUB_CAPACITY: usize = 16;

/// App visibility transitions reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Foreground,
    Background,
}

/// Something that publishes [`LifecycleEvent`]s.
pub trait LifecycleEvents: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent>;
}

/// Broadcast hub the host pushes lifecycle transitions into.
#[derive(Debug, Clone)]
pub struct LifecycleHub {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl Default for LifecycleHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Returns the number of listeners that received it.
    pub fn emit(&self, event: LifecycleEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

impl LifecycleEvents for LifecycleHub {
    fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

/// Handle to a registered listener task.
///
/// Dropping the guard detaches the listener, same as [`Subscription::unsubscribe`].
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Stop listening.
    pub fn unsubscribe(self) {
        self.task.abort();
    }

    /// Whether the listener is still running.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
