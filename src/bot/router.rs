//! Turns inbound updates into handler calls.
//!
//! Precedence for plain text: fixed menu commands (which also abandon any active
//! flow), then the chat's active flow, then the fallback notice. Callback payloads
//! are parsed into a [`CallbackCommand`] and admin-scoped ones are dropped silently
//! for everybody but the admin.

use crate::{
    bot::{
        BotContext,
        callback::CallbackCommand,
        handlers::{admin, customer, wizard},
        telegram::{Update, User},
        views,
    },
    core::Customer,
    errors::{Error, Result},
};
use tracing::{debug, error, instrument, warn};

const FALLBACK_DISPLAY_NAME: &str = "Customer";

/// A classified inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Plain text, including reply-keyboard presses
    Message {
        /// Conversation the answer goes to
        chat_id: i64,
        /// Who wrote it
        sender: Customer,
        /// Message text
        text: String,
    },
    /// Inline button press
    Callback {
        /// Conversation the answer goes to
        chat_id: i64,
        /// Who pressed it
        sender: Customer,
        /// Raw callback payload
        payload: String,
    },
}

impl Event {
    /// Classifies an update; `None` for updates the bot does not react to
    /// (no sender, no text, no payload).
    #[must_use]
    pub fn from_update(update: Update) -> Option<Self> {
        if let Some(query) = update.callback_query {
            let chat_id = query
                .message
                .as_ref()
                .map_or(query.from.id, |message| message.chat.id);
            return Some(Self::Callback {
                chat_id,
                sender: customer_from(&query.from),
                payload: query.data?,
            });
        }

        let message = update.message?;
        let sender = customer_from(message.from.as_ref()?);
        Some(Self::Message {
            chat_id: message.chat.id,
            sender,
            text: message.text?,
        })
    }

    /// Conversation the event belongs to.
    #[must_use]
    pub const fn chat_id(&self) -> i64 {
        match self {
            Self::Message { chat_id, .. } | Self::Callback { chat_id, .. } => *chat_id,
        }
    }

    /// Sender of the event.
    #[must_use]
    pub const fn sender(&self) -> &Customer {
        match self {
            Self::Message { sender, .. } | Self::Callback { sender, .. } => sender,
        }
    }
}

fn customer_from(user: &User) -> Customer {
    let display_name = user
        .first_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_DISPLAY_NAME)
        .to_string();
    Customer {
        user_id: user.id,
        username: user.username.clone().filter(|name| !name.is_empty()),
        display_name,
    }
}

/// Reply-keyboard labels and slash commands that always win over an active flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuCommand {
    Start,
    Catalog,
    Feedback,
    MyOrders,
    Back,
    Admin,
}

impl MenuCommand {
    fn parse(text: &str, is_admin: bool) -> Option<Self> {
        match text.trim() {
            "/start" => Some(Self::Start),
            views::CATALOG_LABEL => Some(Self::Catalog),
            views::FEEDBACK_LABEL => Some(Self::Feedback),
            views::MY_ORDERS_LABEL => Some(Self::MyOrders),
            views::BACK_LABEL => Some(Self::Back),
            "/admin" | views::ADMIN_LABEL if is_admin => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Processes one event under the chat's lock.
///
/// Never fails: handler errors are logged and answered with a generic notice so
/// the webhook can always be acknowledged.
#[instrument(skip(ctx, event), fields(chat_id = event.chat_id(), user_id = event.sender().user_id))]
pub async fn dispatch(ctx: &BotContext, event: &Event) {
    let _guard = ctx.locks.acquire(event.chat_id()).await;

    let outcome = match event {
        Event::Message {
            chat_id,
            sender,
            text,
        } => route_message(ctx, *chat_id, sender, text).await,
        Event::Callback {
            chat_id,
            sender,
            payload,
        } => route_callback(ctx, *chat_id, sender, payload).await,
    };

    if let Err(e) = outcome {
        report_failure(ctx, event.chat_id(), &e).await;
    }
}

async fn route_message(ctx: &BotContext, chat_id: i64, sender: &Customer, text: &str) -> Result<()> {
    if let Some(command) = MenuCommand::parse(text, ctx.is_admin(sender)) {
        debug!(?command, "menu command");
        ctx.sessions.clear(chat_id).await?;
        return match command {
            MenuCommand::Start | MenuCommand::Back => customer::start(ctx, chat_id, sender).await,
            MenuCommand::Catalog => customer::show_catalog(ctx, chat_id).await,
            MenuCommand::Feedback => customer::begin_feedback(ctx, chat_id).await,
            MenuCommand::MyOrders => customer::show_my_orders(ctx, chat_id, sender).await,
            MenuCommand::Admin => admin::show_menu(ctx, chat_id).await,
        };
    }

    match ctx.sessions.get(chat_id).await? {
        Some(session) => wizard::handle_step(ctx, chat_id, sender, session, text).await,
        None => {
            ctx.reply(chat_id, views::fallback()).await;
            Ok(())
        }
    }
}

async fn route_callback(
    ctx: &BotContext,
    chat_id: i64,
    sender: &Customer,
    payload: &str,
) -> Result<()> {
    let Some(command) = CallbackCommand::parse(payload) else {
        warn!(payload, "ignoring unknown callback payload");
        return Ok(());
    };
    if command.is_admin_scoped() && !ctx.is_admin(sender) {
        warn!(%command, "admin callback from non-admin ignored");
        return Ok(());
    }

    debug!(%command, "callback");
    ctx.sessions.clear(chat_id).await?;
    match command {
        CallbackCommand::ShowProduct(id) => customer::show_product(ctx, chat_id, id).await,
        CallbackCommand::PlaceOrder(id) => customer::place_order(ctx, chat_id, sender, id).await,
        CallbackCommand::BackToCatalog => customer::show_catalog(ctx, chat_id).await,
        CallbackCommand::AdminMenu => admin::show_menu(ctx, chat_id).await,
        CallbackCommand::AdminOrders => admin::show_orders(ctx, chat_id).await,
        CallbackCommand::AdminOrder(id) => admin::show_order(ctx, chat_id, id).await,
        CallbackCommand::SetOrderStatus { order_id, status } => {
            admin::transition_status(ctx, chat_id, order_id, status).await
        }
        CallbackCommand::AdminProducts => admin::show_products(ctx, chat_id).await,
        CallbackCommand::AddProduct => admin::begin_add_product(ctx, chat_id).await,
        CallbackCommand::DeleteProduct(id) => admin::delete_product(ctx, chat_id, id).await,
        CallbackCommand::AdminFeedback => admin::show_feedback(ctx, chat_id).await,
        CallbackCommand::AdminFeedbackItem(id) => admin::show_feedback_item(ctx, chat_id, id).await,
        CallbackCommand::ReplyToFeedback(id) => admin::begin_reply(ctx, chat_id, id).await,
    }
}

async fn report_failure(ctx: &BotContext, chat_id: i64, error: &Error) {
    let notice = match error {
        Error::OrderNotFound { .. } => views::not_found("Order"),
        Error::ProductNotFound { .. } => views::not_found("Product"),
        Error::FeedbackNotFound { .. } => views::not_found("Message"),
        other => {
            error!(error = %other, "event handling failed");
            views::try_again_later()
        }
    };
    ctx.reply(chat_id, notice).await;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        bot::session::Session,
        core::{feedback, order, product},
        entities::{Feedback, Order, Product},
        test_utils::{
            TEST_ADMIN_CHAT, TEST_CUSTOMER_CHAT, admin_sender, create_custom_product,
            create_test_order, customer_sender, test_context, test_context_with,
        },
    };
    use chrono::{Duration, Utc};
    use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};

    fn text(chat_id: i64, sender: &Customer, text: &str) -> Event {
        Event::Message {
            chat_id,
            sender: sender.clone(),
            text: text.to_string(),
        }
    }

    fn press(chat_id: i64, sender: &Customer, payload: &str) -> Event {
        Event::Callback {
            chat_id,
            sender: sender.clone(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_event_from_message_update() {
        let update: Update = serde_json::from_str(
            r#"{"update_id":1,"message":{"message_id":5,"chat":{"id":42},
                "from":{"id":42,"first_name":"Ann","username":"ann"},"text":"/start"}}"#,
        )
        .unwrap();
        let event = Event::from_update(update).unwrap();
        assert_eq!(event.chat_id(), 42);
        assert_eq!(event.sender().username.as_deref(), Some("ann"));
        assert!(matches!(event, Event::Message { ref text, .. } if text == "/start"));
    }

    #[test]
    fn test_event_from_callback_update_uses_message_chat() {
        let update: Update = serde_json::from_str(
            r#"{"update_id":2,"callback_query":{"id":"q","from":{"id":7},
                "message":{"message_id":1,"chat":{"id":99}},"data":"admin_orders"}}"#,
        )
        .unwrap();
        let event = Event::from_update(update).unwrap();
        assert_eq!(event.chat_id(), 99);
        assert_eq!(event.sender().display_name, FALLBACK_DISPLAY_NAME);
        assert!(matches!(event, Event::Callback { ref payload, .. } if payload == "admin_orders"));
    }

    #[test]
    fn test_event_ignores_updates_without_text() {
        let update: Update = serde_json::from_str(
            r#"{"update_id":3,"message":{"message_id":1,"chat":{"id":1},"from":{"id":1}}}"#,
        )
        .unwrap();
        assert_eq!(Event::from_update(update), None);

        let empty: Update = serde_json::from_str(r#"{"update_id":4}"#).unwrap();
        assert_eq!(Event::from_update(empty), None);
    }

    #[test]
    fn test_admin_command_only_for_admins() {
        assert_eq!(MenuCommand::parse("/admin", true), Some(MenuCommand::Admin));
        assert_eq!(MenuCommand::parse("/admin", false), None);
        assert_eq!(MenuCommand::parse(views::ADMIN_LABEL, false), None);
        assert_eq!(MenuCommand::parse(" /start ", false), Some(MenuCommand::Start));
    }

    #[tokio::test]
    async fn test_add_product_wizard_end_to_end() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        let chat = TEST_ADMIN_CHAT;

        dispatch(&ctx, &press(chat, &admin, "admin_add_product")).await;
        assert_eq!(ctx.sessions.get(chat).await?, Some(Session::AwaitingProductName));

        dispatch(&ctx, &text(chat, &admin, "X")).await;
        dispatch(&ctx, &text(chat, &admin, "Y")).await;
        dispatch(&ctx, &text(chat, &admin, "1 000")).await;
        assert_eq!(
            ctx.sessions.get(chat).await?,
            Some(Session::AwaitingProductEmoji {
                name: "X".to_string(),
                description: "Y".to_string(),
                price: 1000,
            })
        );
        assert_eq!(Product::find().count(&ctx.database).await?, 0);

        dispatch(&ctx, &text(chat, &admin, "🎁")).await;
        assert_eq!(ctx.sessions.get(chat).await?, None);

        let products = product::list_products(&ctx.database).await?;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "X");
        assert_eq!(products[0].description, "Y");
        assert_eq!(products[0].price, 1000);
        assert_eq!(products[0].emoji, "🎁");
        assert!(notifier.sent_to(chat).iter().any(|r| r.text.contains("Product added")));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_price_reprompts_once() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        let chat = TEST_ADMIN_CHAT;
        let at_price = Session::AwaitingProductPrice {
            name: "X".to_string(),
            description: "Y".to_string(),
        };
        ctx.sessions.set(chat, at_price.clone()).await?;

        dispatch(&ctx, &text(chat, &admin, "abc")).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, views::invalid_price());
        assert_eq!(ctx.sessions.get(chat).await?, Some(at_price));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_admin_callback_is_silent() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(11);
        let chat = TEST_CUSTOMER_CHAT;
        ctx.sessions.set(chat, Session::AwaitingFeedback).await?;
        let pending = create_test_order(&ctx.database, 11, 0).await?;
        let accept = format!("order_accept_{}", pending.id);

        for payload in [
            "admin_orders",
            "admin_add_product",
            accept.as_str(),
            "admin_delete_product_1",
        ] {
            dispatch(&ctx, &press(chat, &customer, payload)).await;
        }

        assert!(notifier.sent().is_empty());
        assert_eq!(ctx.sessions.get(chat).await?, Some(Session::AwaitingFeedback));
        let reloaded = order::get_order_by_id(&ctx.database, pending.id).await?.unwrap();
        assert_eq!(reloaded, pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_cannot_drive_admin_wizard() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(12);
        let chat = TEST_CUSTOMER_CHAT;
        ctx.sessions
            .set(
                chat,
                Session::AwaitingProductEmoji {
                    name: "X".to_string(),
                    description: "Y".to_string(),
                    price: 5,
                },
            )
            .await?;

        dispatch(&ctx, &text(chat, &customer, "🎁")).await;

        assert_eq!(ctx.sessions.get(chat).await?, None);
        assert_eq!(Product::find().count(&ctx.database).await?, 0);
        assert_eq!(notifier.sent_to(chat), vec![views::fallback()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_accept_sets_ready_by_and_notifies_buyer_once() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        let buyer_id = 21;
        let pending = create_test_order(&ctx.database, buyer_id, 0).await?;
        let before = Utc::now();

        dispatch(
            &ctx,
            &press(TEST_ADMIN_CHAT, &admin, &format!("order_accept_{}", pending.id)),
        )
        .await;

        let accepted = order::get_order_by_id(&ctx.database, pending.id).await?.unwrap();
        assert_eq!(accepted.status, "accepted");
        let start = accepted.start_date.unwrap();
        assert!(start >= before - Duration::seconds(1));
        assert_eq!(accepted.end_date, Some(start + Duration::days(3)));

        let to_buyer = notifier.sent_to(buyer_id);
        assert_eq!(to_buyer.len(), 1);
        assert!(to_buyer[0].text.contains("Accepted"));
        assert!(to_buyer[0].text.contains(&views::format_date(start + Duration::days(3))));
        assert_eq!(notifier.sent_to(TEST_ADMIN_CHAT).len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_change_for_unknown_order_reports_not_found() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        dispatch(&ctx, &press(TEST_ADMIN_CHAT, &admin_sender(), "order_complete_404")).await;
        assert_eq!(notifier.sent(), vec![(TEST_ADMIN_CHAT, views::not_found("Order"))]);
        Ok(())
    }

    #[tokio::test]
    async fn test_my_orders_empty() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(31);
        dispatch(&ctx, &text(TEST_CUSTOMER_CHAT, &customer, views::MY_ORDERS_LABEL)).await;

        let sent = notifier.sent_to(TEST_CUSTOMER_CHAT);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, views::NO_ORDERS_TEXT);
        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_from_catalog() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(41);
        let cake = create_custom_product(&ctx.database, "Cake", 1500).await?;

        dispatch(&ctx, &press(TEST_CUSTOMER_CHAT, &customer, &format!("order_{}", cake.id))).await;

        let orders = order::list_orders_for_user(&ctx.database, 41, 10).await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, "pending");
        assert_eq!(orders[0].product_name, "Cake");
        assert_eq!(orders[0].product_price, 1500);
        assert_eq!(orders[0].start_date, None);
        assert!(orders[0].order_number.starts_with("ORD-"));
        assert_eq!(
            notifier.sent_to(TEST_CUSTOMER_CHAT),
            vec![views::order_created(&orders[0])]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_feedback_round_trip() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(51);
        let admin = admin_sender();

        dispatch(&ctx, &text(TEST_CUSTOMER_CHAT, &customer, views::FEEDBACK_LABEL)).await;
        assert_eq!(
            ctx.sessions.get(TEST_CUSTOMER_CHAT).await?,
            Some(Session::AwaitingFeedback)
        );
        dispatch(&ctx, &text(TEST_CUSTOMER_CHAT, &customer, "Where is my cake?")).await;
        assert_eq!(ctx.sessions.get(TEST_CUSTOMER_CHAT).await?, None);

        let items = feedback::list_feedback(&ctx.database, 20).await?;
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_replied);
        let feedback_id = items[0].id;

        dispatch(
            &ctx,
            &press(TEST_ADMIN_CHAT, &admin, &format!("feedback_reply_{feedback_id}")),
        )
        .await;
        assert_eq!(
            ctx.sessions.get(TEST_ADMIN_CHAT).await?,
            Some(Session::AwaitingFeedbackReply { feedback_id })
        );
        dispatch(&ctx, &text(TEST_ADMIN_CHAT, &admin, "Tomorrow!")).await;
        assert_eq!(ctx.sessions.get(TEST_ADMIN_CHAT).await?, None);

        let answered = Feedback::find_by_id(feedback_id).one(&ctx.database).await?.unwrap();
        assert!(answered.is_replied);
        assert_eq!(answered.admin_reply.as_deref(), Some("Tomorrow!"));
        assert!(answered.replied_at.is_some());

        let to_customer = notifier.sent_to(customer.user_id);
        assert_eq!(to_customer, vec![views::feedback_answer(&answered)]);
        assert!(to_customer[0].text.contains("Tomorrow!"));
        Ok(())
    }

    #[tokio::test]
    async fn test_menu_command_abandons_flow() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        ctx.sessions
            .set(TEST_ADMIN_CHAT, Session::AwaitingProductName)
            .await?;

        dispatch(&ctx, &text(TEST_ADMIN_CHAT, &admin, views::BACK_LABEL)).await;

        assert_eq!(ctx.sessions.get(TEST_ADMIN_CHAT).await?, None);
        assert_eq!(notifier.sent(), vec![(TEST_ADMIN_CHAT, views::welcome(true))]);
        assert_eq!(Order::find().count(&ctx.database).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_text_and_payload() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(61);

        dispatch(&ctx, &text(TEST_CUSTOMER_CHAT, &customer, "hello")).await;
        dispatch(&ctx, &press(TEST_CUSTOMER_CHAT, &customer, "order_frobnicate_1")).await;
        dispatch(&ctx, &text(TEST_CUSTOMER_CHAT, &customer, "/admin")).await;

        assert_eq!(
            notifier.sent(),
            vec![
                (TEST_CUSTOMER_CHAT, views::fallback()),
                (TEST_CUSTOMER_CHAT, views::fallback()),
            ]
        );
        Ok(())
    }

    fn at_emoji_step() -> Session {
        Session::AwaitingProductEmoji {
            name: "X".to_string(),
            description: "Y".to_string(),
            price: 1000,
        }
    }

    #[tokio::test]
    async fn test_store_failure_keeps_session_and_asks_to_retry() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        ctx.sessions.set(TEST_ADMIN_CHAT, at_emoji_step()).await?;
        ctx.database.execute_unprepared("DROP TABLE products").await?;

        dispatch(&ctx, &text(TEST_ADMIN_CHAT, &admin, "🎁")).await;

        assert_eq!(ctx.sessions.get(TEST_ADMIN_CHAT).await?, Some(at_emoji_step()));
        assert_eq!(
            notifier.sent(),
            vec![(TEST_ADMIN_CHAT, views::try_again_later())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_product_list_refresh_failure_still_confirms_save() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        ctx.sessions.set(TEST_ADMIN_CHAT, at_emoji_step()).await?;
        // A row whose price is text makes every full listing fail to decode.
        ctx.database
            .execute_unprepared(
                "INSERT INTO products (name, description, price, emoji) \
                 VALUES ('Broken', '', 'not a number', '')",
            )
            .await?;

        dispatch(&ctx, &text(TEST_ADMIN_CHAT, &admin, "🎁")).await;

        assert_eq!(ctx.sessions.get(TEST_ADMIN_CHAT).await?, None);
        let sent = notifier.sent_to(TEST_ADMIN_CHAT);
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Product added"));
        assert!(!sent.contains(&views::try_again_later()));
        Ok(())
    }

    #[tokio::test]
    async fn test_undelivered_feedback_reply_is_reported_to_admin() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let admin = admin_sender();
        let customer = customer_sender(52);
        let item = feedback::create_feedback(&ctx.database, &customer, "Hello?", Utc::now()).await?;
        notifier.fail_deliveries_to(customer.user_id);
        ctx.sessions
            .set(
                TEST_ADMIN_CHAT,
                Session::AwaitingFeedbackReply {
                    feedback_id: item.id,
                },
            )
            .await?;

        dispatch(&ctx, &text(TEST_ADMIN_CHAT, &admin, "Hi there")).await;

        let answered = Feedback::find_by_id(item.id).one(&ctx.database).await?.unwrap();
        assert!(answered.is_replied);
        assert_eq!(ctx.sessions.get(TEST_ADMIN_CHAT).await?, None);
        assert_eq!(notifier.sent(), vec![(TEST_ADMIN_CHAT, views::reply_sent(false))]);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_chat_gets_order_and_feedback_notices() -> Result<()> {
        let notice_chat = 7777;
        let (ctx, notifier) =
            test_context_with(|config| config.bot.admin_chat_id = Some(notice_chat)).await?;
        let customer = customer_sender(53);
        let cake = create_custom_product(&ctx.database, "Cake", 1500).await?;

        dispatch(&ctx, &press(TEST_CUSTOMER_CHAT, &customer, &format!("order_{}", cake.id))).await;
        ctx.sessions
            .set(TEST_CUSTOMER_CHAT, Session::AwaitingFeedback)
            .await?;
        dispatch(&ctx, &text(TEST_CUSTOMER_CHAT, &customer, "Is it fresh?")).await;

        let placed = order::list_orders_for_user(&ctx.database, customer.user_id, 10).await?;
        let items = feedback::list_feedback(&ctx.database, 20).await?;
        assert_eq!(
            notifier.sent_to(notice_chat),
            vec![
                views::new_order_notice(&placed[0]),
                views::new_feedback_notice(&items[0]),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_no_admin_chat_means_no_notices() -> Result<()> {
        let (ctx, notifier) = test_context().await?;
        let customer = customer_sender(54);
        let cake = create_custom_product(&ctx.database, "Cake", 1500).await?;

        dispatch(&ctx, &press(TEST_CUSTOMER_CHAT, &customer, &format!("order_{}", cake.id))).await;

        assert!(notifier.sent().iter().all(|(chat, _)| *chat == TEST_CUSTOMER_CHAT));
        Ok(())
    }
}
