//! Data models for chatcache

pub mod chat;
pub mod ids;
pub mod message;

pub use chat::{Chat, ChatRef, PinOutcome};
pub use ids::{ChatId, MessageId, UserId};
pub use message::Message;
