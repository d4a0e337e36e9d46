//! Event bus for chatcache using tokio::broadcast
//!
//! The store publishes one event per successful mutation.

use crate::models::{ChatId, MessageId, UserId};
use std::collections::BTreeSet;
use tokio::sync::broadcast;

/// Events emitted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// A chat was registered
    ChatCreated {
        chat_id: ChatId,
        participants: BTreeSet<UserId>,
    },
    /// A message was appended to a chat
    MessageSent {
        chat_id: ChatId,
        message_id: MessageId,
        sender_id: UserId,
    },
    /// A message was added to a chat's pinned set
    MessagePinned {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

impl DataEvent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            DataEvent::ChatCreated { chat_id, .. }
            | DataEvent::MessageSent { chat_id, .. }
            | DataEvent::MessagePinned { chat_id, .. } => *chat_id,
        }
    }
}

/// Event bus for broadcasting data events
///
/// Uses tokio::broadcast for multi-consumer support.
pub struct EventBus {
    sender: broadcast::Sender<DataEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (256 events)
    pub fn default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DataEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.sender.subscribe()
    }

    /// Get current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}
