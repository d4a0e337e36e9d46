//! Read-through, write-invalidate cache in front of the chat store
//!
//! Memo entries move `ABSENT -> CACHED` on a read miss and back to `ABSENT`
//! on a matching write. Entries are never patched in place.
//!
//! A miss fetches from the store while holding the key's DashMap entry guard,
//! so fetch + insert is one critical section per key. Evictions contend on the
//! same guard and therefore always land after any in-flight insert.

use crate::error::Result;
use crate::models::{ChatId, ChatRef, Message, MessageId, PinOutcome, UserId};
use crate::store::ChatStore;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Memoized answer of `get_messages`
pub type MessageList = Arc<[Arc<Message>]>;

/// Memoized answer of `get_user_chats`
pub type ChatList = Arc<[ChatRef]>;

/// Configuration for the cache proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every read falls through to the store
    pub enabled: bool,

    /// Evict participants' user-chat lists when a chat is created through the proxy
    pub invalidate_user_chats_on_create: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            invalidate_user_chats_on_create: true,
        }
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub cached_users: usize,
    pub cached_chats: usize,
}

impl CacheStats {
    /// Hit ratio in [0, 1], 0 when nothing was read yet
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Caching proxy over a shared [`ChatStore`]
pub struct CacheProxy {
    store: Arc<ChatStore>,
    config: CacheConfig,

    user_chats: DashMap<UserId, ChatList>,
    messages: DashMap<ChatId, MessageList>,

    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheProxy {
    pub fn new(store: Arc<ChatStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config,
            user_chats: DashMap::new(),
            messages: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(store: Arc<ChatStore>) -> Self {
        Self::new(store, CacheConfig::default())
    }

    /// The store this proxy reads through to
    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ===================
    // Reads (memoized)
    // ===================

    /// Chats the user participates in
    pub fn get_user_chats(&self, user_id: UserId) -> ChatList {
        if !self.config.enabled {
            return self.store.get_user_chats(user_id).into();
        }

        if let Some(hit) = self.user_chats.get(&user_id) {
            self.record_hit();
            debug!(%user_id, "Cache hit for user chats");
            return Arc::clone(hit.value());
        }

        match self.user_chats.entry(user_id) {
            // A concurrent miss got here first
            Entry::Occupied(entry) => {
                self.record_hit();
                debug!(%user_id, "Cache hit for user chats");
                Arc::clone(entry.get())
            }
            Entry::Vacant(slot) => {
                self.record_miss();
                debug!(%user_id, "Cache miss for user chats, fetching from store");
                let chats: ChatList = self.store.get_user_chats(user_id).into();
                slot.insert(Arc::clone(&chats));
                chats
            }
        }
    }

    /// Message history of a chat
    ///
    /// Store errors propagate unchanged and nothing is memoized for them.
    pub fn get_messages(&self, chat_id: ChatId) -> Result<MessageList> {
        if !self.config.enabled {
            return Ok(self.store.get_messages(chat_id)?.into());
        }

        if let Some(hit) = self.messages.get(&chat_id) {
            self.record_hit();
            debug!(%chat_id, "Cache hit for chat messages");
            return Ok(Arc::clone(hit.value()));
        }

        match self.messages.entry(chat_id) {
            Entry::Occupied(entry) => {
                self.record_hit();
                debug!(%chat_id, "Cache hit for chat messages");
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(slot) => {
                self.record_miss();
                debug!(%chat_id, "Cache miss for chat messages, fetching from store");
                let messages: MessageList = self.store.get_messages(chat_id)?.into();
                slot.insert(Arc::clone(&messages));
                Ok(messages)
            }
        }
    }

    // ===================
    // Writes (invalidating)
    // ===================

    /// Create a chat, evicting participants' cached chat lists
    pub fn create_chat(&self, participants: impl IntoIterator<Item = UserId>) -> Result<ChatId> {
        let participants: Vec<UserId> = participants.into_iter().collect();
        let chat_id = self.store.create_chat(participants.iter().copied())?;

        if self.config.invalidate_user_chats_on_create {
            for user_id in participants {
                self.invalidate_user_chats(user_id);
            }
        }

        Ok(chat_id)
    }

    /// Send through the store, then evict the chat's cached history
    pub fn send_message(
        &self,
        chat_id: ChatId,
        sender_id: UserId,
        content: impl Into<String>,
    ) -> Result<MessageId> {
        let message_id = self.store.send_message(chat_id, sender_id, content)?;
        self.invalidate_messages(chat_id);
        Ok(message_id)
    }

    /// Pin state is never cached; delegates to the store
    pub fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> PinOutcome {
        self.store.pin_message(chat_id, message_id)
    }

    /// Pin state is never cached; delegates to the store
    pub fn list_pinned(&self, chat_id: ChatId) -> Result<Vec<Arc<Message>>> {
        self.store.list_pinned(chat_id)
    }

    // ===================
    // Cache management
    // ===================

    /// Drop the cached history of one chat. Returns true if an entry existed.
    pub fn invalidate_messages(&self, chat_id: ChatId) -> bool {
        let removed = self.messages.remove(&chat_id).is_some();
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(%chat_id, "Invalidated cached chat messages");
        }
        removed
    }

    /// Drop the cached chat list of one user. Returns true if an entry existed.
    pub fn invalidate_user_chats(&self, user_id: UserId) -> bool {
        let removed = self.user_chats.remove(&user_id).is_some();
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(%user_id, "Invalidated cached user chats");
        }
        removed
    }

    /// Drop every memo entry
    pub fn clear(&self) {
        let dropped = self.user_chats.len() + self.messages.len();
        self.user_chats.clear();
        self.messages.clear();
        self.invalidations
            .fetch_add(dropped as u64, Ordering::Relaxed);
        debug!(dropped, "Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            cached_users: self.user_chats.len(),
            cached_chats: self.messages.len(),
        }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}
