//! Error types for chatcache-core
//!
//! Store failures propagate unchanged through the cache proxy, so a single
//! error enum covers both layers.

use crate::models::ChatId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which id allocator ran out of space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Chat,
    Message,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Chat => f.write_str("chat"),
            IdKind::Message => f.write_str("message"),
        }
    }
}

/// Core error type for chatcache operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Store Errors
    // ===================
    #[error("Chat not found: {chat_id}")]
    ChatNotFound { chat_id: ChatId },

    #[error("No free {kind} id left to allocate")]
    IdSpaceExhausted { kind: IdKind },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

impl CoreError {
    /// True for the "unknown chat id" family of failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ChatNotFound { .. })
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, CoreError>;
