//! Shared test utilities for the shop bot.
//!
//! This module provides helpers for setting up test databases, creating test
//! rows with sensible defaults, building detached entity models for view tests,
//! and a bot context wired to a notifier that records instead of sending. The
//! notifier can also be told to fail for chosen chats.

use crate::{
    bot::{
        BotContext,
        session::InMemorySessionStore,
        telegram::{Notifier, Reply},
    },
    config::AppConfig,
    core::{Customer, order, product},
    entities,
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};

/// Admin handle configured in [`test_context`].
pub const TEST_ADMIN: &str = "shop_admin";
/// Chat the admin talks to the bot from.
pub const TEST_ADMIN_CHAT: i64 = 9000;
/// Chat customers talk to the bot from in handler tests.
pub const TEST_CUSTOMER_CHAT: i64 = 1000;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed point in time used for rows that need deterministic timestamps.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * description: "Test description"
/// * price: 1000
/// * emoji: "📦"
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    product::create_product(db, name, "Test description", 1000, "📦").await
}

/// Creates a test product with a custom price.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
) -> Result<entities::product::Model> {
    product::create_product(db, name, "Test description", price, "📦").await
}

/// A customer with a username derived from the id.
#[must_use]
pub fn test_customer(user_id: i64) -> Customer {
    Customer {
        user_id,
        username: Some(format!("customer{user_id}")),
        display_name: format!("Customer {user_id}"),
    }
}

/// Customer sender used by handler tests.
#[must_use]
pub fn customer_sender(user_id: i64) -> Customer {
    test_customer(user_id)
}

/// Sender matching [`TEST_ADMIN`].
#[must_use]
pub fn admin_sender() -> Customer {
    Customer {
        user_id: TEST_ADMIN_CHAT,
        username: Some(TEST_ADMIN.to_string()),
        display_name: "Admin".to_string(),
    }
}

/// Places a pending order for `user_id`, `offset_minutes` after [`base_time`].
///
/// Every call creates its own product. Distinct offsets keep order numbers unique.
pub async fn create_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    offset_minutes: i64,
) -> Result<entities::order::Model> {
    let product = create_test_product(db, "Test Product").await?;
    order::create_order(
        db,
        &test_customer(user_id),
        &product,
        base_time() + Duration::minutes(offset_minutes),
    )
    .await
}

/// Detached product row for view tests.
#[must_use]
pub fn product_model(id: i64, name: &str, price: i64, emoji: &str) -> entities::product::Model {
    entities::product::Model {
        id,
        name: name.to_string(),
        description: format!("About {name}"),
        price,
        emoji: emoji.to_string(),
    }
}

/// Detached order row for view tests; no dates set, no username.
#[must_use]
pub fn order_model(
    id: i64,
    product_name: &str,
    status: &str,
    offset_minutes: i64,
) -> entities::order::Model {
    let created_at = base_time() + Duration::minutes(offset_minutes);
    entities::order::Model {
        id,
        order_number: order::generate_order_number(created_at),
        telegram_user_id: 100 + id,
        telegram_username: None,
        customer_name: format!("Customer {id}"),
        product_id: id,
        product_name: product_name.to_string(),
        product_price: 1000,
        executor: None,
        notes: None,
        status: status.to_string(),
        start_date: None,
        end_date: None,
        created_at,
    }
}

/// Detached, unanswered feedback row for view tests.
#[must_use]
pub fn feedback_model(id: i64, message: &str, offset_minutes: i64) -> entities::feedback::Model {
    entities::feedback::Model {
        id,
        telegram_user_id: 100 + id,
        telegram_username: None,
        customer_name: format!("Customer {id}"),
        message: message.to_string(),
        admin_reply: None,
        is_replied: false,
        created_at: base_time() + Duration::minutes(offset_minutes),
        replied_at: None,
    }
}

/// Notifier that keeps every reply instead of calling the Bot API.
///
/// Chats passed to [`RecordingNotifier::fail_deliveries_to`] get an error and
/// nothing is recorded for them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, Reply)>>,
    unreachable: Mutex<Vec<i64>>,
}

impl RecordingNotifier {
    /// Makes every later send to `chat_id` fail.
    pub fn fail_deliveries_to(&self, chat_id: i64) {
        if let Ok(mut unreachable) = self.unreachable.lock() {
            unreachable.push(chat_id);
        }
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<(i64, Reply)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Replies sent to one chat, in order.
    #[must_use]
    pub fn sent_to(&self, chat_id: i64) -> Vec<Reply> {
        self.sent()
            .into_iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, reply)| reply)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        let unreachable = self
            .unreachable
            .lock()
            .is_ok_and(|chats| chats.contains(&chat_id));
        if unreachable {
            return Err(Error::Telegram {
                message: format!("Forbidden: bot was blocked by the user {chat_id}"),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((chat_id, reply.clone()));
        }
        Ok(())
    }
}

/// Bot context over a fresh in-memory database, with [`TEST_ADMIN`] as admin and
/// no admin notice chat.
pub async fn test_context() -> Result<(BotContext, Arc<RecordingNotifier>)> {
    test_context_with(|_| {}).await
}

/// Like [`test_context`], with `configure` applied to the settings first.
pub async fn test_context_with(
    configure: impl FnOnce(&mut AppConfig),
) -> Result<(BotContext, Arc<RecordingNotifier>)> {
    let db = setup_test_db().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut config = AppConfig::default();
    config.bot.admin_username = TEST_ADMIN.to_string();
    configure(&mut config);

    let ctx = BotContext::new(
        db,
        Arc::new(InMemorySessionStore::new()),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        Arc::new(config),
    );
    Ok((ctx, notifier))
}
