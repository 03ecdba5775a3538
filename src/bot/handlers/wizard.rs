//! Steps of the multi-message flows.
//!
//! ```text
//! AwaitingProductName -> AwaitingProductDescription -> AwaitingProductPrice
//!     -> AwaitingProductEmoji -> (product stored, idle)
//! AwaitingFeedbackReply -> (reply stored, customer notified, idle)
//! AwaitingFeedback -> (feedback stored, idle)
//! ```
//!
//! An unparseable price keeps the chat at the price step.

use crate::{
    bot::{BotContext, handlers::customer, session::Session, views},
    core::{Customer, feedback, product},
    errors::{Error, Result},
};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Feeds `text` into the chat's current flow.
pub async fn handle_step(
    ctx: &BotContext,
    chat_id: i64,
    sender: &Customer,
    session: Session,
    text: &str,
) -> Result<()> {
    if session.is_admin_flow() && !ctx.is_admin(sender) {
        warn!(chat_id, "discarding admin flow held by a non-admin sender");
        ctx.sessions.clear(chat_id).await?;
        ctx.reply(chat_id, views::fallback()).await;
        return Ok(());
    }

    debug!(chat_id, ?session, "wizard step");
    match session {
        Session::AwaitingFeedback => customer::submit_feedback(ctx, chat_id, sender, text).await,
        Session::AwaitingProductName => product_name(ctx, chat_id, text).await,
        Session::AwaitingProductDescription { name } => {
            ctx.sessions
                .set(
                    chat_id,
                    Session::AwaitingProductPrice {
                        name,
                        description: text.trim().to_string(),
                    },
                )
                .await?;
            ctx.reply(chat_id, views::product_price_prompt()).await;
            Ok(())
        }
        Session::AwaitingProductPrice { name, description } => {
            product_price(ctx, chat_id, name, description, text).await
        }
        Session::AwaitingProductEmoji {
            name,
            description,
            price,
        } => product_emoji(ctx, chat_id, &name, &description, price, text).await,
        Session::AwaitingFeedbackReply { feedback_id } => {
            feedback_reply(ctx, chat_id, feedback_id, text).await
        }
    }
}

async fn product_name(ctx: &BotContext, chat_id: i64, text: &str) -> Result<()> {
    let name = text.trim();
    if name.is_empty() {
        ctx.reply(chat_id, views::text_required()).await;
        return Ok(());
    }
    ctx.sessions
        .set(
            chat_id,
            Session::AwaitingProductDescription {
                name: name.to_string(),
            },
        )
        .await?;
    ctx.reply(chat_id, views::product_description_prompt(name))
        .await;
    Ok(())
}

async fn product_price(
    ctx: &BotContext,
    chat_id: i64,
    name: String,
    description: String,
    text: &str,
) -> Result<()> {
    let Ok(price) = product::parse_price(text) else {
        ctx.reply(chat_id, views::invalid_price()).await;
        return Ok(());
    };
    ctx.sessions
        .set(
            chat_id,
            Session::AwaitingProductEmoji {
                name,
                description,
                price,
            },
        )
        .await?;
    ctx.reply(chat_id, views::product_emoji_prompt(price)).await;
    Ok(())
}

async fn product_emoji(
    ctx: &BotContext,
    chat_id: i64,
    name: &str,
    description: &str,
    price: i64,
    text: &str,
) -> Result<()> {
    let created = product::create_product(&ctx.database, name, description, price, text).await?;
    ctx.sessions.clear(chat_id).await?;
    info!(product_id = created.id, "product added");

    ctx.reply(chat_id, views::product_added(&created)).await;
    // The product is stored; a failed list refresh must not read as a failed save.
    match product::list_products(&ctx.database).await {
        Ok(products) => ctx.reply(chat_id, views::admin_products(&products)).await,
        Err(e) => warn!(error = %e, "failed to refresh product list after adding a product"),
    }
    Ok(())
}

async fn feedback_reply(ctx: &BotContext, chat_id: i64, feedback_id: i64, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        ctx.reply(chat_id, views::text_required()).await;
        return Ok(());
    }

    let answered =
        match feedback::update_feedback_reply(&ctx.database, feedback_id, text, Utc::now()).await {
            Ok(answered) => answered,
            Err(Error::FeedbackNotFound { .. }) => {
                ctx.sessions.clear(chat_id).await?;
                ctx.reply(chat_id, views::not_found("Message")).await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
    ctx.sessions.clear(chat_id).await?;
    info!(feedback_id, "feedback answered");

    let delivered = match ctx
        .notifier
        .send(answered.telegram_user_id, &views::feedback_answer(&answered))
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(feedback_id, error = %e, "failed to deliver reply to customer");
            false
        }
    };
    ctx.reply(chat_id, views::reply_sent(delivered)).await;
    Ok(())
}
