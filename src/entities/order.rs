//! Order entity - A customer's purchase of a single catalog product.
//!
//! Orders carry a snapshot of the product (`product_name`, `product_price`) taken at
//! creation time and the buyer's Telegram identity, which doubles as the chat to
//! notify on status changes. `status` stores one of the
//! [`OrderStatus`](crate::core::order::OrderStatus) wire strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable order number (`ORD-<unix seconds>`)
    #[sea_orm(unique)]
    pub order_number: String,
    /// Telegram user id of the buyer, also their private chat id
    pub telegram_user_id: i64,
    /// Telegram `@username` of the buyer, if they have one
    pub telegram_username: Option<String>,
    /// Buyer's display name
    pub customer_name: String,
    /// Product the order was placed for (may no longer exist)
    pub product_id: i64,
    /// Product name at the time of ordering
    pub product_name: String,
    /// Product price at the time of ordering
    pub product_price: i64,
    /// Person assigned to fulfil the order
    pub executor: Option<String>,
    /// Internal notes
    pub notes: Option<String>,
    /// `"pending"`, `"accepted"`, `"processing"`, `"completed"` or `"cancelled"`
    pub status: String,
    /// When work on the order started
    pub start_date: Option<DateTimeUtc>,
    /// Promised ready-by date
    pub end_date: Option<DateTimeUtc>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Orders keep snapshots instead of a foreign key so products stay deletable
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
