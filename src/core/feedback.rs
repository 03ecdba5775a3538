//! Feedback business logic - customer messages to support and the admin's replies.

use crate::{
    core::Customer,
    entities::{Feedback, feedback},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Stores a new, unanswered feedback message.
pub async fn create_feedback(
    db: &DatabaseConnection,
    customer: &Customer,
    message: &str,
    now: DateTime<Utc>,
) -> Result<feedback::Model> {
    let feedback = feedback::ActiveModel {
        telegram_user_id: Set(customer.user_id),
        telegram_username: Set(customer.username.clone()),
        customer_name: Set(customer.display_name.clone()),
        message: Set(message.to_string()),
        admin_reply: Set(None),
        is_replied: Set(false),
        created_at: Set(now),
        replied_at: Set(None),
        ..Default::default()
    };
    feedback.insert(db).await.map_err(Into::into)
}

/// Retrieves a specific feedback message by its unique ID.
pub async fn get_feedback_by_id(
    db: &DatabaseConnection,
    feedback_id: i64,
) -> Result<Option<feedback::Model>> {
    Feedback::find_by_id(feedback_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The admin inbox: unanswered messages first, newest first within each group.
pub async fn list_feedback(db: &DatabaseConnection, limit: u64) -> Result<Vec<feedback::Model>> {
    Feedback::find()
        .order_by_asc(feedback::Column::IsReplied)
        .order_by_desc(feedback::Column::CreatedAt)
        .order_by_desc(feedback::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records the admin's answer and marks the message as replied.
///
/// # Errors
/// Returns [`Error::FeedbackNotFound`] for an unknown id, or a database error.
pub async fn update_feedback_reply(
    db: &DatabaseConnection,
    feedback_id: i64,
    reply: &str,
    replied_at: DateTime<Utc>,
) -> Result<feedback::Model> {
    let mut feedback: feedback::ActiveModel = Feedback::find_by_id(feedback_id)
        .one(db)
        .await?
        .ok_or(Error::FeedbackNotFound { id: feedback_id })?
        .into();

    feedback.admin_reply = Set(Some(reply.to_string()));
    feedback.is_replied = Set(true);
    feedback.replied_at = Set(Some(replied_at));

    feedback.update(db).await.map_err(Into::into)
}
