//! Event bus for roleboard using tokio::broadcast
//!
//! Consumers subscribe to learn when the collection or the filter changed
//! and re-read the derived views.

use tokio::sync::broadcast;

/// Events emitted by the training store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// A CSV ingest finished and replaced the collection
    DataLoaded { records: usize },
    /// An ingest failed; the collection is unchanged
    LoadFailed(String),
    /// Inclusion overrides or the month range changed
    FilterChanged,
    /// The collection was emptied
    Cleared,
}

/// Event bus for broadcasting data events
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create with default capacity (64 events)
    pub fn default_capacity() -> Self {
        Self::new(64)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DataEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
