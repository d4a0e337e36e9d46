//! Chat store with DashMap + parking_lot::RwLock
//!
//! DashMap holds the chat registry (per-shard locking), each chat sits behind
//! its own parking_lot::RwLock so writers to one chat never block another.

use crate::error::{CoreError, IdKind, Result};
use crate::event::{DataEvent, EventBus};
use crate::models::{Chat, ChatId, ChatRef, Message, MessageId, PinOutcome, UserId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the chat store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Chat ids run from 1 to this value inclusive
    pub chat_id_space: u64,

    /// Message ids run from 1 to this value inclusive
    pub message_id_space: u64,

    /// Event bus channel capacity
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chat_id_space: u64::MAX,
            message_id_space: u64::MAX,
            event_capacity: 256,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chat_id_space == 0 || self.message_id_space == 0 {
            return Err(CoreError::InvalidConfig {
                message: "id space must allow at least one id".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(CoreError::InvalidConfig {
                message: "event_capacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Monotonic id source handing out `1..=ceiling`
#[derive(Debug)]
struct IdAllocator {
    /// Number of ids handed out so far; the next id is `issued + 1`
    issued: AtomicU64,
    ceiling: u64,
    kind: IdKind,
}

impl IdAllocator {
    fn new(kind: IdKind, ceiling: u64) -> Self {
        Self {
            issued: AtomicU64::new(0),
            ceiling,
            kind,
        }
    }

    fn allocate(&self) -> Result<u64> {
        let ceiling = self.ceiling;
        self.issued
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |issued| {
                (issued < ceiling).then(|| issued + 1)
            })
            .map(|issued| issued + 1)
            .map_err(|_| CoreError::IdSpaceExhausted { kind: self.kind })
    }
}

/// Authoritative owner of all chats and messages
///
/// Construct one per application and share it behind `Arc`.
pub struct ChatStore {
    /// Configuration
    config: StoreConfig,

    /// Chat registry
    chats: DashMap<ChatId, ChatRef>,

    chat_ids: IdAllocator,

    /// Message ids are global, not per chat
    message_ids: IdAllocator,

    /// Event bus for notifying subscribers
    event_bus: EventBus,
}

impl ChatStore {
    /// Create a new chat store
    pub fn new(config: StoreConfig) -> Self {
        Self {
            chats: DashMap::new(),
            chat_ids: IdAllocator::new(IdKind::Chat, config.chat_id_space),
            message_ids: IdAllocator::new(IdKind::Message, config.message_id_space),
            event_bus: EventBus::new(config.event_capacity.max(1)),
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the event bus for subscribing to updates
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ===================
    // Write operations
    // ===================

    /// Register an empty chat with the given participants
    pub fn create_chat(&self, participants: impl IntoIterator<Item = UserId>) -> Result<ChatId> {
        let participants: BTreeSet<UserId> = participants.into_iter().collect();

        loop {
            let chat_id = ChatId::new(self.chat_ids.allocate()?);

            match self.chats.entry(chat_id) {
                Entry::Occupied(_) => {
                    warn!(%chat_id, "Allocated chat id already registered, trying next");
                }
                Entry::Vacant(slot) => {
                    // Shard stays locked until the event is out, so no send can precede it
                    let registered =
                        slot.insert(ChatRef::new(Chat::new(chat_id, participants.clone())));
                    info!(%chat_id, participants = participants.len(), "Chat created");
                    self.event_bus.publish(DataEvent::ChatCreated {
                        chat_id,
                        participants,
                    });
                    drop(registered);
                    return Ok(chat_id);
                }
            }
        }
    }

    /// Append a new message to a chat
    pub fn send_message(
        &self,
        chat_id: ChatId,
        sender_id: UserId,
        content: impl Into<String>,
    ) -> Result<MessageId> {
        let chat = self.chat(chat_id)?;
        let message_id = MessageId::new(self.message_ids.allocate()?);
        let message = Arc::new(Message::new(message_id, sender_id, content.into()));

        // Publish under the chat's write guard: event order is append order
        let mut guard = chat.write();
        guard.append(message);
        info!(%chat_id, %message_id, %sender_id, "Message sent");
        self.event_bus.publish(DataEvent::MessageSent {
            chat_id,
            message_id,
            sender_id,
        });
        drop(guard);

        Ok(message_id)
    }

    /// Pin a message; every non-`Pinned` outcome is a logged no-op
    pub fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> PinOutcome {
        let Some(chat) = self.get_chat(chat_id) else {
            warn!(%chat_id, %message_id, "Pin ignored: chat not found");
            return PinOutcome::ChatNotFound;
        };

        let mut guard = chat.write();
        let outcome = guard.pin(message_id);

        match outcome {
            PinOutcome::Pinned => {
                info!(%chat_id, %message_id, "Message pinned");
                self.event_bus.publish(DataEvent::MessagePinned {
                    chat_id,
                    message_id,
                });
            }
            PinOutcome::AlreadyPinned => {
                debug!(%chat_id, %message_id, "Pin ignored: already pinned");
            }
            PinOutcome::MessageNotFound | PinOutcome::ChatNotFound => {
                warn!(%chat_id, %message_id, "Pin ignored: message not found");
            }
        }
        drop(guard);

        outcome
    }

    // ===================
    // Read accessors
    // ===================

    /// Current message history of a chat
    pub fn get_messages(&self, chat_id: ChatId) -> Result<Vec<Arc<Message>>> {
        Ok(self.chat(chat_id)?.messages())
    }

    /// Pinned messages of a chat, in pin order
    pub fn list_pinned(&self, chat_id: ChatId) -> Result<Vec<Arc<Message>>> {
        Ok(self.chat(chat_id)?.pinned())
    }

    /// All chats the user participates in, ordered by chat id
    ///
    /// Full scan, there is no participant index.
    pub fn get_user_chats(&self, user_id: UserId) -> Vec<ChatRef> {
        // Clone handles out first so no shard guard is held while locking chats
        let candidates: Vec<ChatRef> = self.chats.iter().map(|r| r.value().clone()).collect();

        let mut chats: Vec<ChatRef> = candidates
            .into_iter()
            .filter(|chat| chat.has_participant(user_id))
            .collect();
        chats.sort_by_key(ChatRef::id);

        debug!(%user_id, count = chats.len(), "User chats scanned");
        chats
    }

    /// Get chat by ID
    pub fn get_chat(&self, chat_id: ChatId) -> Option<ChatRef> {
        self.chats.get(&chat_id).map(|r| r.value().clone())
    }

    /// Get chat count
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    /// Get all chat IDs, ascending
    pub fn chat_ids(&self) -> Vec<ChatId> {
        let mut ids: Vec<ChatId> = self.chats.iter().map(|r| *r.key()).collect();
        ids.sort();
        ids
    }

    fn chat(&self, chat_id: ChatId) -> Result<ChatRef> {
        self.get_chat(chat_id)
            .ok_or(CoreError::ChatNotFound { chat_id })
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
