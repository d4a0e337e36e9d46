//! Immutable chat message record

use super::{MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message as stored in a chat
///
/// Built once by the store on send and shared behind `Arc` afterwards.
/// There is no mutable access to any field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender_id: UserId,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn new(id: MessageId, sender_id: UserId, content: String) -> Self {
        Self {
            id,
            sender_id,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender_id(&self) -> UserId {
        self.sender_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
