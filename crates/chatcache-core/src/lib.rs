//! chatcache-core - Core library for chatcache
//!
//! An in-memory chat store with a read-through, write-invalidate cache proxy
//! in front of it, plus the small collaborators around them (events, contact
//! lists, notification/call/file side effects, configuration).

pub mod actions;
pub mod cache;
pub mod config;
pub mod contacts;
pub mod error;
pub mod event;
pub mod models;
pub mod store;

pub use actions::{perform, Action, ActionSink, NotificationService, TracingSink};
pub use cache::{CacheConfig, CacheProxy, CacheStats};
pub use config::ChatcacheConfig;
pub use contacts::{Contact, ContactList, ContactStatus};
pub use error::{CoreError, IdKind};
pub use event::{DataEvent, EventBus};
pub use models::{Chat, ChatId, ChatRef, Message, MessageId, PinOutcome, UserId};
pub use store::{ChatStore, StoreConfig};
