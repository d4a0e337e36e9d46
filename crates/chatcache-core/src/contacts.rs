//! Friend and block lists

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Friend,
    Blocked,
}

/// A named user record tagged with its relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub status: ContactStatus,
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            ContactStatus::Friend => write!(f, "Friend: {}", self.name),
            ContactStatus::Blocked => write!(f, "Blocked: {}", self.name),
        }
    }
}

/// Friends and blocked users, each in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactList {
    friends: Vec<Contact>,
    blocked: Vec<Contact>,
}

impl ContactList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a friend. Returns false if already a friend or blocked.
    pub fn add_friend(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        debug!(%name, "Added friend");
        self.friends.push(Contact {
            name,
            status: ContactStatus::Friend,
        });
        true
    }

    /// Block a user, removing them from friends if present.
    /// Returns false if already blocked.
    pub fn block(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.blocked.iter().any(|c| c.name == name) {
            return false;
        }
        self.friends.retain(|c| c.name != name);
        debug!(%name, "Blocked user");
        self.blocked.push(Contact {
            name,
            status: ContactStatus::Blocked,
        });
        true
    }

    pub fn friends(&self) -> &[Contact] {
        &self.friends
    }

    pub fn blocked(&self) -> &[Contact] {
        &self.blocked
    }

    pub fn is_blocked(&self, name: &str) -> bool {
        self.blocked.iter().any(|c| c.name == name)
    }

    fn contains(&self, name: &str) -> bool {
        self.friends.iter().chain(&self.blocked).any(|c| c.name == name)
    }

    /// Human-readable listing of both lists
    pub fn render(&self) -> String {
        let mut out = String::from("List of Friends:\n");
        for contact in &self.friends {
            out.push_str(&format!("{}\n", contact));
        }
        out.push_str("List of Blocked Users:\n");
        for contact in &self.blocked {
            out.push_str(&format!("{}\n", contact));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_friend_is_idempotent() {
        let mut list = ContactList::new();
        assert!(list.add_friend("Alice"));
        assert!(!list.add_friend("Alice"));
        assert_eq!(list.friends().len(), 1);
    }

    #[test]
    fn test_block_moves_friend() {
        let mut list = ContactList::new();
        list.add_friend("Alice");
        list.add_friend("Bob");

        assert!(list.block("Bob"));
        assert!(!list.block("Bob"));
        assert!(!list.add_friend("Bob"));

        assert_eq!(list.friends().len(), 1);
        assert!(list.is_blocked("Bob"));
        assert_eq!(
            list.render(),
            "List of Friends:\nFriend: Alice\nList of Blocked Users:\nBlocked: Bob\n"
        );
    }
}
