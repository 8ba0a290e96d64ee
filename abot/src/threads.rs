//! Per-user assistant thread registry.
//!
//! The Assistants API keeps conversation state server-side in threads; the bot only
//! remembers which thread belongs to which Telegram user. In-memory only: a restart
//! starts everyone on a fresh thread via /start.

use dashmap::DashMap;

/// Concurrent map from Telegram user id to assistant thread id.
#[derive(Default)]
pub struct ThreadRegistry {
    threads: DashMap<i64, String>,
}

impl ThreadRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            threads: DashMap::new(),
        }
    }

    /// Returns the thread id registered for the user, if any.
    pub fn get(&self, user_id: i64) -> Option<String> {
        self.threads.get(&user_id).map(|entry| entry.clone())
    }

    /// Registers (or replaces) the user's thread id.
    pub fn insert(&self, user_id: i64, thread_id: String) {
        self.threads.insert(user_id, thread_id);
    }

    /// Number of users with a registered thread.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
