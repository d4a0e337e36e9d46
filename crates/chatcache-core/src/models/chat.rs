//! Chat record and the shared handle callers read it through

use super::{ChatId, Message, MessageId, UserId};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Result of a pin request
///
/// Pinning never fails: the non-`Pinned` variants are logged no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned,
    ChatNotFound,
    MessageNotFound,
    AlreadyPinned,
}

impl PinOutcome {
    pub fn is_pinned(self) -> bool {
        matches!(self, PinOutcome::Pinned)
    }
}

/// A chat: participants, append-only history, pinned subset
#[derive(Debug, Clone, Serialize)]
pub struct Chat {
    id: ChatId,
    participants: BTreeSet<UserId>,
    messages: Vec<Arc<Message>>,
    pinned: Vec<Arc<Message>>,
}

impl Chat {
    pub(crate) fn new(id: ChatId, participants: BTreeSet<UserId>) -> Self {
        Self {
            id,
            participants,
            messages: Vec::new(),
            pinned: Vec::new(),
        }
    }

    pub fn id(&self) -> ChatId {
        self.id
    }

    pub fn participants(&self) -> &BTreeSet<UserId> {
        &self.participants
    }

    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    pub fn pinned(&self) -> &[Arc<Message>] {
        &self.pinned
    }

    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }

    pub(crate) fn append(&mut self, message: Arc<Message>) {
        self.messages.push(message);
    }

    /// Pin a message of this chat, keeping insertion order and no duplicates
    pub(crate) fn pin(&mut self, message_id: MessageId) -> PinOutcome {
        if self.pinned.iter().any(|m| m.id() == message_id) {
            return PinOutcome::AlreadyPinned;
        }

        match self.messages.iter().find(|m| m.id() == message_id) {
            Some(message) => {
                self.pinned.push(Arc::clone(message));
                PinOutcome::Pinned
            }
            None => PinOutcome::MessageNotFound,
        }
    }
}

/// Shared, read-only handle to a chat owned by the store
///
/// Cloning is cheap (one `Arc`). Reads go through the chat's lock, so a
/// handle always shows the chat's current state, never a half-applied write.
#[derive(Clone)]
pub struct ChatRef {
    id: ChatId,
    inner: Arc<RwLock<Chat>>,
}

impl ChatRef {
    pub(crate) fn new(chat: Chat) -> Self {
        Self {
            id: chat.id,
            inner: Arc::new(RwLock::new(chat)),
        }
    }

    pub fn id(&self) -> ChatId {
        self.id
    }

    pub fn participants(&self) -> BTreeSet<UserId> {
        self.inner.read().participants.clone()
    }

    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.inner.read().has_participant(user_id)
    }

    /// Current message history (snapshot of shared message handles)
    pub fn messages(&self) -> Vec<Arc<Message>> {
        self.inner.read().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn pinned(&self) -> Vec<Arc<Message>> {
        self.inner.read().pinned.clone()
    }

    /// Owned copy of the whole chat, e.g. for serialization
    pub fn snapshot(&self) -> Chat {
        self.inner.read().clone()
    }

    /// True if both handles point at the same stored chat
    pub fn ptr_eq(a: &ChatRef, b: &ChatRef) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Chat> {
        self.inner.write()
    }
}

impl fmt::Debug for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chat = self.inner.read();
        f.debug_struct("ChatRef")
            .field("id", &self.id)
            .field("participants", &chat.participants)
            .field("messages", &chat.messages.len())
            .field("pinned", &chat.pinned.len())
            .finish()
    }
}
