//! Admin handlers: order queue and status changes, product management, feedback inbox.
//!
//! The router only calls these after the role gate passed for the current event.

use crate::{
    bot::{BotContext, session::Session, views},
    core::{feedback, order, order::OrderStatus, product},
    errors::{Error, Result},
};
use chrono::Utc;
use tracing::{info, instrument};

/// Admin start screen.
pub async fn show_menu(ctx: &BotContext, chat_id: i64) -> Result<()> {
    ctx.reply(chat_id, views::admin_menu()).await;
    Ok(())
}

/// Order queue ordered by status priority.
pub async fn show_orders(ctx: &BotContext, chat_id: i64) -> Result<()> {
    let orders =
        order::list_orders_admin(&ctx.database, views::ADMIN_ORDERS_LIMIT as u64).await?;
    ctx.reply(chat_id, views::admin_order_queue(&orders)).await;
    Ok(())
}

/// One order with its status buttons.
pub async fn show_order(ctx: &BotContext, chat_id: i64, order_id: i64) -> Result<()> {
    let reply = order::get_order_by_id(&ctx.database, order_id)
        .await?
        .map_or_else(|| views::not_found("Order"), |o| views::admin_order_detail(&o));
    ctx.reply(chat_id, reply).await;
    Ok(())
}

/// Moves an order to `status`, tells the buyer, and shows the admin the updated card.
#[instrument(skip(ctx))]
pub async fn transition_status(
    ctx: &BotContext,
    chat_id: i64,
    order_id: i64,
    status: OrderStatus,
) -> Result<()> {
    let updated = match order::transition_status(
        &ctx.database,
        order_id,
        status,
        ctx.config.orders.ready_by_days,
        Utc::now(),
    )
    .await
    {
        Ok(updated) => updated,
        Err(Error::OrderNotFound { .. }) => {
            ctx.reply(chat_id, views::not_found("Order")).await;
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    info!(order_number = %updated.order_number, %status, "order status changed");

    ctx.notify_buyer(&updated).await;
    ctx.reply(chat_id, views::admin_order_detail(&updated)).await;
    Ok(())
}

/// Product management list.
pub async fn show_products(ctx: &BotContext, chat_id: i64) -> Result<()> {
    let products = product::list_products(&ctx.database).await?;
    ctx.reply(chat_id, views::admin_products(&products)).await;
    Ok(())
}

/// Starts the add-product wizard.
pub async fn begin_add_product(ctx: &BotContext, chat_id: i64) -> Result<()> {
    ctx.sessions.set(chat_id, Session::AwaitingProductName).await?;
    ctx.reply(chat_id, views::product_name_prompt()).await;
    Ok(())
}

/// Deletes a product and shows the refreshed list.
#[instrument(skip(ctx))]
pub async fn delete_product(ctx: &BotContext, chat_id: i64, product_id: i64) -> Result<()> {
    match product::delete_product(&ctx.database, product_id).await {
        Ok(()) => {
            info!("product deleted");
            ctx.reply(chat_id, views::product_deleted(product_id)).await;
        }
        Err(Error::ProductNotFound { .. }) => {
            ctx.reply(chat_id, views::not_found("Product")).await;
        }
        Err(e) => return Err(e),
    }
    show_products(ctx, chat_id).await
}

/// Feedback inbox.
pub async fn show_feedback(ctx: &BotContext, chat_id: i64) -> Result<()> {
    let items = feedback::list_feedback(&ctx.database, views::ADMIN_FEEDBACK_LIMIT as u64).await?;
    ctx.reply(chat_id, views::admin_feedback_queue(&items)).await;
    Ok(())
}

/// One feedback message.
pub async fn show_feedback_item(ctx: &BotContext, chat_id: i64, feedback_id: i64) -> Result<()> {
    let reply = feedback::get_feedback_by_id(&ctx.database, feedback_id)
        .await?
        .map_or_else(
            || views::not_found("Message"),
            |f| views::admin_feedback_detail(&f),
        );
    ctx.reply(chat_id, reply).await;
    Ok(())
}

/// Starts the reply wizard for one feedback message.
pub async fn begin_reply(ctx: &BotContext, chat_id: i64, feedback_id: i64) -> Result<()> {
    let Some(item) = feedback::get_feedback_by_id(&ctx.database, feedback_id).await? else {
        ctx.reply(chat_id, views::not_found("Message")).await;
        return Ok(());
    };
    ctx.sessions
        .set(chat_id, Session::AwaitingFeedbackReply { feedback_id })
        .await?;
    ctx.reply(chat_id, views::reply_prompt(&item)).await;
    Ok(())
}
