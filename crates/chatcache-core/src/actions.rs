//! Fire-and-forget side effects: notifications, calls, file transfers
//!
//! Every effect is an [`Action`] delivered to an injected [`ActionSink`].
//! Sinks swallow their own failures; nothing here returns an error.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Voice,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Image,
    Video,
}

impl FileKind {
    /// Guess the kind from a path's extension, defaulting to text
    pub fn from_path(path: &str) -> Self {
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "png" | "jpg" | "jpeg" | "gif" | "webp" => FileKind::Image,
            "mp4" | "mov" | "mkv" | "webm" => FileKind::Video,
            _ => FileKind::Text,
        }
    }
}

/// A side effect requested by the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Notify {
        channel: NotificationChannel,
        message: String,
    },
    StartCall {
        kind: CallKind,
        caller: String,
        receiver: String,
    },
    EndCall {
        caller: String,
        receiver: String,
    },
    SendFile {
        kind: FileKind,
        path: String,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Notify { channel, message } => {
                let channel = match channel {
                    NotificationChannel::Email => "Email",
                    NotificationChannel::Sms => "SMS",
                };
                write!(f, "{} notification sent: {}", channel, message)
            }
            Action::StartCall {
                kind,
                caller,
                receiver,
            } => {
                let kind = match kind {
                    CallKind::Voice => "Voice",
                    CallKind::Video => "Video",
                };
                write!(f, "{} call started from {} to {}", kind, caller, receiver)
            }
            Action::EndCall { caller, receiver } => {
                write!(f, "Call between {} and {} ended", caller, receiver)
            }
            Action::SendFile { kind, path } => {
                let kind = match kind {
                    FileKind::Text => "Text",
                    FileKind::Image => "Image",
                    FileKind::Video => "Video",
                };
                write!(f, "{} file sent: {}", kind, path)
            }
        }
    }
}

/// Destination for actions
pub trait ActionSink: Send + Sync {
    fn deliver(&self, action: &Action);
}

/// Default sink: logs each action
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ActionSink for TracingSink {
    fn deliver(&self, action: &Action) {
        info!(action = %action, "Action performed");
    }
}

/// Sink that keeps every delivered action, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Action>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.delivered.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }
}

impl ActionSink for RecordingSink {
    fn deliver(&self, action: &Action) {
        self.delivered.lock().push(action.clone());
    }
}

/// Perform one action against a sink
pub fn perform(sink: &dyn ActionSink, action: Action) {
    sink.deliver(&action);
}

/// Fans a message out to every registered notification channel
#[derive(Debug, Default, Clone)]
pub struct NotificationService {
    channels: Vec<NotificationChannel>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel; registering twice is a no-op
    pub fn add_channel(&mut self, channel: NotificationChannel) {
        if !self.channels.contains(&channel) {
            self.channels.push(channel);
        }
    }

    pub fn channels(&self) -> &[NotificationChannel] {
        &self.channels
    }

    pub fn notify_all(&self, sink: &dyn ActionSink, message: &str) {
        for &channel in &self.channels {
            perform(
                sink,
                Action::Notify {
                    channel,
                    message: message.to_string(),
                },
            );
        }
    }
}
