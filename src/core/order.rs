//! Order business logic - creation, status transitions and listings.
//!
//! Orders start out `pending` with no dates. Moving an order into `accepted` or
//! `processing` opens a ready-by window that starts now and ends a configured
//! number of days later; every other transition leaves the dates alone.
//!
//! Order numbers are `ORD-<unix seconds>`. Two orders placed within the same
//! second collide on the unique `order_number` column and the second insert fails;
//! that is an accepted limitation, not something this module retries around.

use crate::{
    core::Customer,
    entities::{Order, order, product},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use std::{fmt, str::FromStr};

/// Queue position shared by cancelled orders and unrecognised statuses.
pub const OTHER_QUEUE_PRIORITY: u8 = 4;

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Placed by the customer, not yet seen by the admin
    Pending,
    /// Confirmed by the admin
    Accepted,
    /// Work in progress
    Processing,
    /// Delivered
    Completed,
    /// Dropped by the admin
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The value stored in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable label shown to customers and the admin.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Awaiting confirmation",
            Self::Accepted => "Accepted",
            Self::Processing => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Status marker used in listings.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::Accepted => "💳",
            Self::Processing => "⚙️",
            Self::Completed => "✅",
            Self::Cancelled => "❌",
        }
    }

    /// Position in the admin queue; lower sorts first.
    #[must_use]
    pub const fn queue_priority(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Processing => 2,
            Self::Completed => 3,
            Self::Cancelled => OTHER_QUEUE_PRIORITY,
        }
    }

    /// Whether entering this status opens a ready-by window.
    #[must_use]
    pub const fn sets_ready_by(self) -> bool {
        matches!(self, Self::Accepted | Self::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidStatus {
                status: s.to_string(),
            })
    }
}

/// Parses the stored status of an order, `None` for values written by something else.
#[must_use]
pub fn status_of(order: &order::Model) -> Option<OrderStatus> {
    order.status.parse().ok()
}

/// Builds the human-readable order number for an order placed at `now`.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!("ORD-{}", now.timestamp())
}

/// Computes `(start_date, end_date)` for a transition into `status`, if it opens a window.
#[must_use]
pub fn ready_by_window(
    status: OrderStatus,
    now: DateTime<Utc>,
    ready_by_days: i64,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    status
        .sets_ready_by()
        .then(|| (now, now + Duration::days(ready_by_days)))
}

/// Places a `pending` order for `product` on behalf of `customer`.
///
/// # Errors
/// Returns an error if the insert fails, including an order-number collision.
pub async fn create_order(
    db: &DatabaseConnection,
    customer: &Customer,
    product: &product::Model,
    now: DateTime<Utc>,
) -> Result<order::Model> {
    let order = order::ActiveModel {
        order_number: Set(generate_order_number(now)),
        telegram_user_id: Set(customer.user_id),
        telegram_username: Set(customer.username.clone()),
        customer_name: Set(customer.display_name.clone()),
        product_id: Set(product.id),
        product_name: Set(product.name.clone()),
        product_price: Set(product.price),
        executor: Set(None),
        notes: Set(None),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        start_date: Set(None),
        end_date: Set(None),
        created_at: Set(now),
        ..Default::default()
    };
    order.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific order by its unique ID.
pub async fn get_order_by_id(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The most recent orders of one customer, newest first.
pub async fn list_orders_for_user(
    db: &DatabaseConnection,
    user_id: i64,
    limit: u64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::TelegramUserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The admin work queue: pending first, then accepted, processing, completed and
/// everything else, newest first within each status.
pub async fn list_orders_admin(db: &DatabaseConnection, limit: u64) -> Result<Vec<order::Model>> {
    let priority = Expr::cust(
        "CASE status WHEN 'pending' THEN 0 WHEN 'accepted' THEN 1 \
         WHEN 'processing' THEN 2 WHEN 'completed' THEN 3 ELSE 4 END",
    );
    Order::find()
        .order_by(priority, sea_orm::Order::Asc)
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every order, newest first.
pub async fn list_all_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes a new status and, when given, new start/end dates.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] for an unknown id, or a database error.
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<order::Model> {
    let mut order = find_active(db, order_id).await?;

    order.status = Set(status.as_str().to_string());
    if let Some(start) = start_date {
        order.start_date = Set(Some(start));
    }
    if let Some(end) = end_date {
        order.end_date = Set(Some(end));
    }

    order.update(db).await.map_err(Into::into)
}

/// Moves an order into `status`, opening the ready-by window when the status calls for it.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] for an unknown id, or a database error.
pub async fn transition_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: OrderStatus,
    ready_by_days: i64,
    now: DateTime<Utc>,
) -> Result<order::Model> {
    let window = ready_by_window(status, now, ready_by_days);
    update_order_status(
        db,
        order_id,
        status,
        window.map(|(start, _)| start),
        window.map(|(_, end)| end),
    )
    .await
}

/// Assigns (or clears) the person fulfilling an order.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] for an unknown id, or a database error.
pub async fn update_order_executor(
    db: &DatabaseConnection,
    order_id: i64,
    executor: Option<String>,
) -> Result<order::Model> {
    let mut order = find_active(db, order_id).await?;
    order.executor = Set(executor.filter(|e| !e.trim().is_empty()));
    order.update(db).await.map_err(Into::into)
}

/// Overrides the promised ready-by date.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] for an unknown id, or a database error.
pub async fn update_order_end_date(
    db: &DatabaseConnection,
    order_id: i64,
    end_date: DateTime<Utc>,
) -> Result<order::Model> {
    let mut order = find_active(db, order_id).await?;
    order.end_date = Set(Some(end_date));
    order.update(db).await.map_err(Into::into)
}

/// Permanently removes an order.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if nothing was deleted.
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let result = Order::delete_by_id(order_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::OrderNotFound { id: order_id });
    }
    Ok(())
}

async fn find_active(db: &DatabaseConnection, order_id: i64) -> Result<order::ActiveModel> {
    Ok(Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?
        .into())
}
