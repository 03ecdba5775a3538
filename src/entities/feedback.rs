//! Feedback entity - A message a customer sent to support, plus the admin's answer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Feedback message database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedback_messages")]
pub struct Model {
    /// Unique identifier for the message
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Telegram user id of the author, also their private chat id
    pub telegram_user_id: i64,
    /// Telegram `@username` of the author
    pub telegram_username: Option<String>,
    /// Author's display name
    pub customer_name: String,
    /// The text the customer sent
    pub message: String,
    /// The admin's answer, once given
    pub admin_reply: Option<String>,
    /// Set together with `admin_reply`
    pub is_replied: bool,
    /// When the customer sent the message
    pub created_at: DateTimeUtc,
    /// When the admin answered
    pub replied_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
