//! Caching layer for chatcache-core
//!
//! Provides the read-through, write-invalidate proxy over the chat store.

pub mod proxy;

pub use proxy::{CacheConfig, CacheProxy, CacheStats, ChatList, MessageList};
