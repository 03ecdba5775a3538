//! Conversation state that survives between webhook deliveries.
//!
//! A chat with no stored [`Session`] is idle. Wizards store one variant per step,
//! each carrying exactly the draft fields collected so far. The store sits behind
//! the [`SessionStore`] trait so a shared key-value backend can replace the
//! in-process map when the service runs on more than one instance.
//!
//! [`ConversationLocks`] serializes events of the same chat; different chats never
//! wait on each other.

use crate::errors::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Step of an unfinished multi-message flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum Session {
    /// Customer pressed "Feedback"; the next text is their message
    AwaitingFeedback,
    /// Add-product wizard, step 1
    AwaitingProductName,
    /// Add-product wizard, step 2
    AwaitingProductDescription {
        /// Draft name
        name: String,
    },
    /// Add-product wizard, step 3
    AwaitingProductPrice {
        /// Draft name
        name: String,
        /// Draft description
        description: String,
    },
    /// Add-product wizard, step 4
    AwaitingProductEmoji {
        /// Draft name
        name: String,
        /// Draft description
        description: String,
        /// Parsed price
        price: i64,
    },
    /// Admin is typing an answer to a feedback message
    AwaitingFeedbackReply {
        /// Message being answered
        feedback_id: i64,
    },
}

impl Session {
    /// Whether this flow may only be driven by the admin.
    #[must_use]
    pub const fn is_admin_flow(&self) -> bool {
        !matches!(self, Self::AwaitingFeedback)
    }
}

/// Storage for per-chat sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session of `chat_id`, `None` when idle.
    async fn get(&self, chat_id: i64) -> Result<Option<Session>>;
    /// Replaces the session of `chat_id`.
    async fn set(&self, chat_id: i64, session: Session) -> Result<()>;
    /// Returns `chat_id` to idle.
    async fn clear(&self, chat_id: i64) -> Result<()>;
}

/// Process-local [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<i64, Session>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats with an unfinished flow.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when every chat is idle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: i64) -> Result<Option<Session>> {
        Ok(self.sessions.get(&chat_id).map(|entry| entry.value().clone()))
    }

    async fn set(&self, chat_id: i64, session: Session) -> Result<()> {
        self.sessions.insert(chat_id, session);
        Ok(())
    }

    async fn clear(&self, chat_id: i64) -> Result<()> {
        self.sessions.remove(&chat_id);
        Ok(())
    }
}

/// One async mutex per chat, created on demand and dropped once nobody holds or awaits it.
#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ConversationLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other event of `chat_id` is being processed.
    pub async fn acquire(&self, chat_id: i64) -> ConversationGuard<'_> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let lock = Arc::clone(self.locks.entry(chat_id).or_default().value());
        let guard = lock.lock_owned().await;
        ConversationGuard {
            chat_id,
            locks: self,
            guard: Some(guard),
        }
    }

    /// Number of chats currently holding or awaiting a lock.
    #[must_use]
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Held while an event is processed; releasing it may free the chat's lock entry.
#[derive(Debug)]
pub struct ConversationGuard<'a> {
    chat_id: i64,
    locks: &'a ConversationLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ConversationGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.chat_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
