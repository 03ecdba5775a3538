//! Bot layer - Telegram-specific conversation engine.
//!
//! Inbound updates become [`router::Event`]s, the router picks a handler based on
//! fixed commands, the chat's [`session::Session`] and callback payloads, and
//! handlers answer through the [`telegram::Notifier`].

/// Inline button payload encoding
pub mod callback;
/// Customer and admin handlers, plus the wizard steps
pub mod handlers;
/// Event classification and dispatch
pub mod router;
/// Per-chat conversation state and locking
pub mod session;
/// Bot API types and the outbound notifier
pub mod telegram;
/// Pure reply builders
pub mod views;

use crate::{config::AppConfig, core::Customer, entities::order};
use sea_orm::DatabaseConnection;
use session::{ConversationLocks, SessionStore};
use std::sync::Arc;
use telegram::{Notifier, Reply};
use tracing::warn;

/// Shared data available to every handler.
/// Holds the database connection, the session store, the outbound notifier and
/// the application settings.
pub struct BotContext {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Conversation state between deliveries
    pub sessions: Arc<dyn SessionStore>,
    /// Outbound message delivery
    pub notifier: Arc<dyn Notifier>,
    /// Per-chat event serialization
    pub locks: ConversationLocks,
    /// Application settings
    pub config: Arc<AppConfig>,
}

impl BotContext {
    /// Creates a new `BotContext`.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            database,
            sessions,
            notifier,
            locks: ConversationLocks::new(),
            config,
        }
    }

    /// Role gate, evaluated on every admin-scoped command.
    #[must_use]
    pub fn is_admin(&self, sender: &Customer) -> bool {
        is_admin(sender, &self.config.bot.admin_username)
    }

    /// Sends a reply whose loss only deserves a log line.
    pub async fn reply(&self, chat_id: i64, reply: Reply) {
        if let Err(e) = self.notifier.send(chat_id, &reply).await {
            warn!(chat_id, error = %e, "failed to deliver reply");
        }
    }

    /// Best-effort notice to the configured admin chat, if any.
    pub async fn notify_admin(&self, reply: Reply) {
        if let Some(admin_chat) = self.config.bot.admin_chat_id {
            self.reply(admin_chat, reply).await;
        }
    }

    /// Tells the buyer their order changed status; returns whether it was delivered.
    pub async fn notify_buyer(&self, order: &order::Model) -> bool {
        match self
            .notifier
            .send(order.telegram_user_id, &views::status_changed(order))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    order_number = %order.order_number,
                    error = %e,
                    "failed to notify buyer about status change"
                );
                false
            }
        }
    }
}

/// Case-insensitive comparison of the sender's handle with the configured admin handle.
///
/// Senders without a public username are never admins.
#[must_use]
pub fn is_admin(sender: &Customer, admin_username: &str) -> bool {
    let admin = admin_username.trim().trim_start_matches('@');
    !admin.is_empty()
        && sender
            .username
            .as_deref()
            .is_some_and(|name| name.trim_start_matches('@').eq_ignore_ascii_case(admin))
}
