//! Customer-facing handlers: menu, catalog, ordering, order history and feedback.

use crate::{
    bot::{BotContext, session::Session, views},
    core::{Customer, feedback, order, product},
    errors::Result,
};
use chrono::Utc;
use tracing::{info, instrument};

/// `/start`, "Back" and anything else that returns to the main menu.
pub async fn start(ctx: &BotContext, chat_id: i64, sender: &Customer) -> Result<()> {
    ctx.reply(chat_id, views::welcome(ctx.is_admin(sender))).await;
    Ok(())
}

/// Lists every product as an inline button.
pub async fn show_catalog(ctx: &BotContext, chat_id: i64) -> Result<()> {
    let products = product::list_products(&ctx.database).await?;
    ctx.reply(chat_id, views::catalog(&products)).await;
    Ok(())
}

/// Product card with the order button.
pub async fn show_product(ctx: &BotContext, chat_id: i64, product_id: i64) -> Result<()> {
    let reply = product::get_product_by_id(&ctx.database, product_id)
        .await?
        .map_or_else(|| views::not_found("Product"), |p| views::product_detail(&p));
    ctx.reply(chat_id, reply).await;
    Ok(())
}

/// Creates a pending order for the pressed product and confirms it to the buyer.
#[instrument(skip(ctx, sender), fields(user_id = sender.user_id))]
pub async fn place_order(
    ctx: &BotContext,
    chat_id: i64,
    sender: &Customer,
    product_id: i64,
) -> Result<()> {
    let Some(product) = product::get_product_by_id(&ctx.database, product_id).await? else {
        ctx.reply(chat_id, views::not_found("Product")).await;
        return Ok(());
    };

    let order = order::create_order(&ctx.database, sender, &product, Utc::now()).await?;
    info!(order_number = %order.order_number, "order placed");

    ctx.reply(chat_id, views::order_created(&order)).await;
    ctx.notify_admin(views::new_order_notice(&order)).await;
    Ok(())
}

/// The sender's most recent orders.
pub async fn show_my_orders(ctx: &BotContext, chat_id: i64, sender: &Customer) -> Result<()> {
    let orders =
        order::list_orders_for_user(&ctx.database, sender.user_id, views::MY_ORDERS_LIMIT as u64)
            .await?;
    ctx.reply(chat_id, views::my_orders(&orders)).await;
    Ok(())
}

/// "Feedback" pressed: the next text becomes a support message.
pub async fn begin_feedback(ctx: &BotContext, chat_id: i64) -> Result<()> {
    ctx.sessions.set(chat_id, Session::AwaitingFeedback).await?;
    ctx.reply(chat_id, views::contact_info()).await;
    ctx.reply(chat_id, views::feedback_prompt()).await;
    Ok(())
}

/// Stores the support message, then returns the chat to idle.
#[instrument(skip(ctx, sender, text), fields(user_id = sender.user_id))]
pub async fn submit_feedback(
    ctx: &BotContext,
    chat_id: i64,
    sender: &Customer,
    text: &str,
) -> Result<()> {
    if text.trim().is_empty() {
        ctx.reply(chat_id, views::text_required()).await;
        return Ok(());
    }

    let feedback = feedback::create_feedback(&ctx.database, sender, text, Utc::now()).await?;
    ctx.sessions.clear(chat_id).await?;
    info!(feedback_id = feedback.id, "feedback received");

    ctx.reply(chat_id, views::feedback_received(ctx.is_admin(sender)))
        .await;
    ctx.notify_admin(views::new_feedback_notice(&feedback)).await;
    Ok(())
}
