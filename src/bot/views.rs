//! Presentation builders.
//!
//! Every function here is pure: rows in, [`Reply`] out. Ordering and caps of the
//! listings are applied here as well, so the output is fully determined by the
//! input collection regardless of how the rows were fetched.

use crate::{
    bot::{
        callback::CallbackCommand,
        telegram::{InlineButton, Reply, ReplyMarkup, escape_html},
    },
    core::order::{OTHER_QUEUE_PRIORITY, OrderStatus, status_of},
    entities::{feedback, order, product},
};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

/// Menu label: catalog
pub const CATALOG_LABEL: &str = "📦 Catalog";
/// Menu label: feedback
pub const FEEDBACK_LABEL: &str = "💬 Feedback";
/// Menu label: order history
pub const MY_ORDERS_LABEL: &str = "📋 My orders";
/// Menu label: abandon the current flow
pub const BACK_LABEL: &str = "◀️ Back";
/// Menu label: admin panel (admins only)
pub const ADMIN_LABEL: &str = "⚙️ Admin panel";

/// Entries shown in "My orders".
pub const MY_ORDERS_LIMIT: usize = 10;
/// Entries shown in the admin order queue.
pub const ADMIN_ORDERS_LIMIT: usize = 20;
/// Entries shown in the admin feedback inbox.
pub const ADMIN_FEEDBACK_LIMIT: usize = 20;

/// Text of "My orders" for a customer without orders.
pub const NO_ORDERS_TEXT: &str =
    "📋 <b>My orders</b>\n\nYou have no orders yet.\nTake a look at our catalog! 📦";

const FEEDBACK_PREVIEW_CHARS: usize = 30;

/// Formats a price with thousands separators: `1234567` becomes `1,234,567`.
#[must_use]
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if price < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a date as `DD.MM.YYYY`.
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d.%m.%Y").to_string()
}

fn status_label(order: &order::Model) -> (&'static str, String) {
    status_of(order).map_or_else(
        || ("📦", escape_html(&order.status)),
        |status| (status.emoji(), status.label().to_string()),
    )
}

fn main_keyboard(is_admin: bool) -> ReplyMarkup {
    if is_admin {
        ReplyMarkup::keyboard(&[
            &[CATALOG_LABEL],
            &[FEEDBACK_LABEL, MY_ORDERS_LABEL],
            &[ADMIN_LABEL],
        ])
    } else {
        ReplyMarkup::keyboard(&[&[CATALOG_LABEL], &[FEEDBACK_LABEL, MY_ORDERS_LABEL]])
    }
}

fn back_keyboard() -> ReplyMarkup {
    ReplyMarkup::keyboard(&[&[BACK_LABEL]])
}

fn back_button(label: &str, command: CallbackCommand) -> Vec<InlineButton> {
    vec![InlineButton::new(format!("◀️ {label}"), command)]
}

// ---- customer screens ----

/// Greeting with the main menu; admins get an extra row.
#[must_use]
pub fn welcome(is_admin: bool) -> Reply {
    let mut text = String::from(
        "🛍️ <b>Welcome to EasyShop!</b>\n\n\
         Use the buttons below to navigate:\n\
         📦 Catalog - browse our products\n\
         💬 Feedback - write to us\n\
         📋 My orders - your order history",
    );
    if is_admin {
        text.push_str("\n⚙️ Admin panel - manage the shop");
    }
    Reply::with_markup(text, main_keyboard(is_admin))
}

/// Answer to text that matches nothing.
#[must_use]
pub fn fallback() -> Reply {
    Reply::text("❓ Please use the menu buttons to navigate.")
}

/// Generic failure notice; never carries internal detail.
#[must_use]
pub fn try_again_later() -> Reply {
    Reply::text("⚠️ Something went wrong. Please try again later.")
}

/// A referenced entity no longer exists.
#[must_use]
pub fn not_found(what: &str) -> Reply {
    Reply::text(format!("❌ {what} not found."))
}

/// Re-prompt when a flow step received an empty message.
#[must_use]
pub fn text_required() -> Reply {
    Reply::text("✏️ Please send a text message.")
}

/// One button per product.
#[must_use]
pub fn catalog(products: &[product::Model]) -> Reply {
    if products.is_empty() {
        return Reply::text("📦 <b>Catalog</b>\n\nThe catalog is empty for now. Check back soon!");
    }
    let rows = products
        .iter()
        .map(|p| {
            vec![InlineButton::new(
                format!("{} {} - {} ₽", p.emoji, p.name, format_price(p.price)),
                CallbackCommand::ShowProduct(p.id),
            )]
        })
        .collect();
    Reply::with_markup(
        "📦 <b>Catalog</b>\n\nChoose a product to order:",
        ReplyMarkup::inline(rows),
    )
}

/// Product card with an order button.
#[must_use]
pub fn product_detail(p: &product::Model) -> Reply {
    let text = format!(
        "{} <b>{}</b>\n\n{}\n\n💰 <b>Price:</b> {} ₽\n\nPlace an order?",
        escape_html(&p.emoji),
        escape_html(&p.name),
        escape_html(&p.description),
        format_price(p.price)
    );
    Reply::with_markup(
        text,
        ReplyMarkup::inline(vec![
            vec![InlineButton::new(
                "✅ Place order",
                CallbackCommand::PlaceOrder(p.id),
            )],
            back_button("Back to catalog", CallbackCommand::BackToCatalog),
        ]),
    )
}

/// Confirmation sent to the buyer right after ordering.
#[must_use]
pub fn order_created(o: &order::Model) -> Reply {
    Reply::text(format!(
        "🎉 <b>Order placed!</b>\n\n\
         <b>{}</b>\n💰 {} ₽\n\n\
         📝 <b>Order number:</b> #{}\n\
         ⏳ <b>Status:</b> {}\n\n\
         We will contact you shortly to confirm.\n\n\
         Track it under 📋 My orders",
        escape_html(&o.product_name),
        format_price(o.product_price),
        o.order_number,
        OrderStatus::Pending.label()
    ))
}

/// Customer's recent orders, newest first.
#[must_use]
pub fn my_orders(orders: &[order::Model]) -> Reply {
    if orders.is_empty() {
        return Reply::text(NO_ORDERS_TEXT);
    }
    let mut sorted: Vec<&order::Model> = orders.iter().collect();
    sorted.sort_by_key(|o| Reverse((o.created_at, o.id)));

    let mut text = String::from("📋 <b>My orders</b>\n");
    for o in sorted.into_iter().take(MY_ORDERS_LIMIT) {
        let (emoji, label) = status_label(o);
        text.push_str(&format!(
            "\n{emoji} <b>{}</b>\nOrder: #{}\nStatus: {label}\n",
            escape_html(&o.product_name),
            o.order_number
        ));
        if let Some(end) = o.end_date {
            text.push_str(&format!("Ready by: {}\n", format_date(end)));
        }
    }
    Reply::text(text.trim_end().to_string())
}

/// Buyer notice after the admin changed an order's status.
#[must_use]
pub fn status_changed(o: &order::Model) -> Reply {
    let (emoji, label) = status_label(o);
    let mut text = format!(
        "🔔 <b>Order #{} updated</b>\n\n<b>{}</b>\nStatus: {emoji} {label}",
        o.order_number,
        escape_html(&o.product_name)
    );
    if let Some(end) = o.end_date {
        text.push_str(&format!("\nReady by: {}", format_date(end)));
    }
    Reply::text(text)
}

/// Static support contacts, shown before the feedback prompt.
#[must_use]
pub fn contact_info() -> Reply {
    Reply::text(
        "📞 <b>Contacts</b>\n\n\
         ✉️ Email: support@easyshop.example\n\
         💬 Telegram: @easyshop_support\n\
         We are online from 9:00 to 21:00.",
    )
}

/// Prompt shown after pressing "Feedback".
#[must_use]
pub fn feedback_prompt() -> Reply {
    Reply::with_markup(
        "💬 <b>Feedback</b>\n\n\
         Write your message and we will answer right here.\n\
         Press ◀️ Back to cancel.",
        back_keyboard(),
    )
}

/// Thank-you after a feedback message was stored.
#[must_use]
pub fn feedback_received(is_admin: bool) -> Reply {
    Reply::with_markup(
        "✅ Thank you! Your message has been sent. We will reply soon.",
        main_keyboard(is_admin),
    )
}

/// The admin's answer, as delivered to the customer.
#[must_use]
pub fn feedback_answer(f: &feedback::Model) -> Reply {
    Reply::text(format!(
        "💬 <b>Reply from support</b>\n\n\
         Your message:\n<i>{}</i>\n\n{}",
        escape_html(&f.message),
        escape_html(f.admin_reply.as_deref().unwrap_or_default())
    ))
}

// ---- admin notices ----

/// Sent to the admin chat when a customer places an order.
#[must_use]
pub fn new_order_notice(o: &order::Model) -> Reply {
    Reply::with_markup(
        format!(
            "🆕 <b>New order #{}</b>\n\n{} - {} ₽\nCustomer: {}",
            o.order_number,
            escape_html(&o.product_name),
            format_price(o.product_price),
            customer_line(&o.customer_name, o.telegram_username.as_deref())
        ),
        ReplyMarkup::inline(vec![vec![InlineButton::new(
            "Open order",
            CallbackCommand::AdminOrder(o.id),
        )]]),
    )
}

/// Sent to the admin chat when a customer writes to support.
#[must_use]
pub fn new_feedback_notice(f: &feedback::Model) -> Reply {
    Reply::with_markup(
        format!(
            "✉️ <b>New message</b> from {}\n\n{}",
            customer_line(&f.customer_name, f.telegram_username.as_deref()),
            escape_html(&f.message)
        ),
        ReplyMarkup::inline(vec![vec![InlineButton::new(
            "↩️ Reply",
            CallbackCommand::ReplyToFeedback(f.id),
        )]]),
    )
}

fn customer_line(name: &str, username: Option<&str>) -> String {
    username.map_or_else(
        || escape_html(name),
        |u| format!("{} (@{})", escape_html(name), escape_html(u)),
    )
}

// ---- admin screens ----

/// Admin start screen.
#[must_use]
pub fn admin_menu() -> Reply {
    Reply::with_markup(
        "⚙️ <b>Admin panel</b>\n\nWhat would you like to manage?",
        ReplyMarkup::inline(vec![
            vec![InlineButton::new("📋 Orders", CallbackCommand::AdminOrders)],
            vec![InlineButton::new("📦 Products", CallbackCommand::AdminProducts)],
            vec![InlineButton::new("💬 Feedback", CallbackCommand::AdminFeedback)],
        ]),
    )
}

/// Work queue: status priority first, then newest first, capped.
#[must_use]
pub fn admin_order_queue(orders: &[order::Model]) -> Reply {
    let mut sorted: Vec<&order::Model> = orders.iter().collect();
    sorted.sort_by_key(|o| {
        (
            status_of(o).map_or(OTHER_QUEUE_PRIORITY, OrderStatus::queue_priority),
            Reverse((o.created_at, o.id)),
        )
    });
    sorted.truncate(ADMIN_ORDERS_LIMIT);

    let text = if sorted.is_empty() {
        "📋 <b>Orders</b>\n\nNo orders yet.".to_string()
    } else {
        format!("📋 <b>Orders</b> ({})\n\nSelect an order:", sorted.len())
    };

    let mut rows: Vec<Vec<InlineButton>> = sorted
        .into_iter()
        .map(|o| {
            let (emoji, _) = status_label(o);
            vec![InlineButton::new(
                format!("{emoji} #{} · {}", o.order_number, o.product_name),
                CallbackCommand::AdminOrder(o.id),
            )]
        })
        .collect();
    rows.push(back_button("Back", CallbackCommand::AdminMenu));
    Reply::with_markup(text, ReplyMarkup::inline(rows))
}

const fn transition_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "⏳ Back to pending",
        OrderStatus::Accepted => "💳 Accept",
        OrderStatus::Processing => "⚙️ Start work",
        OrderStatus::Completed => "✅ Complete",
        OrderStatus::Cancelled => "❌ Cancel",
    }
}

/// Full order card with one button per reachable status.
#[must_use]
pub fn admin_order_detail(o: &order::Model) -> Reply {
    let (emoji, label) = status_label(o);
    let optional = |value: Option<&str>| value.map_or_else(|| "—".to_string(), escape_html);
    let optional_date = |value: Option<DateTime<Utc>>| value.map_or_else(|| "—".to_string(), format_date);

    let text = format!(
        "📝 <b>Order #{}</b>\n\n\
         <b>Product:</b> {} ({} ₽)\n\
         <b>Customer:</b> {}\n\
         <b>Status:</b> {emoji} {label}\n\
         <b>Executor:</b> {}\n\
         <b>Notes:</b> {}\n\
         <b>Started:</b> {}\n\
         <b>Ready by:</b> {}\n\
         <b>Created:</b> {}",
        o.order_number,
        escape_html(&o.product_name),
        format_price(o.product_price),
        customer_line(&o.customer_name, o.telegram_username.as_deref()),
        optional(o.executor.as_deref()),
        optional(o.notes.as_deref()),
        optional_date(o.start_date),
        optional_date(o.end_date),
        o.created_at.format("%d.%m.%Y %H:%M"),
    );

    let current = status_of(o);
    let mut rows: Vec<Vec<InlineButton>> = OrderStatus::ALL
        .into_iter()
        .filter(|status| Some(*status) != current)
        .map(|status| {
            vec![InlineButton::new(
                transition_label(status),
                CallbackCommand::SetOrderStatus {
                    order_id: o.id,
                    status,
                },
            )]
        })
        .collect();
    rows.push(back_button("Back to orders", CallbackCommand::AdminOrders));
    Reply::with_markup(text, ReplyMarkup::inline(rows))
}

/// Inbox: unanswered first, then newest first, capped.
#[must_use]
pub fn admin_feedback_queue(items: &[feedback::Model]) -> Reply {
    let mut sorted: Vec<&feedback::Model> = items.iter().collect();
    sorted.sort_by_key(|f| (f.is_replied, Reverse((f.created_at, f.id))));
    sorted.truncate(ADMIN_FEEDBACK_LIMIT);

    let open = sorted.iter().filter(|f| !f.is_replied).count();
    let text = if sorted.is_empty() {
        "💬 <b>Feedback</b>\n\nNo messages yet.".to_string()
    } else {
        format!("💬 <b>Feedback</b>\n\nUnanswered: {open}")
    };

    let mut rows: Vec<Vec<InlineButton>> = sorted
        .into_iter()
        .map(|f| {
            let marker = if f.is_replied { "✅" } else { "✉️" };
            let preview: String = f.message.chars().take(FEEDBACK_PREVIEW_CHARS).collect();
            vec![InlineButton::new(
                format!("{marker} {}: {preview}", f.customer_name),
                CallbackCommand::AdminFeedbackItem(f.id),
            )]
        })
        .collect();
    rows.push(back_button("Back", CallbackCommand::AdminMenu));
    Reply::with_markup(text, ReplyMarkup::inline(rows))
}

/// One feedback message with a reply button while unanswered.
#[must_use]
pub fn admin_feedback_detail(f: &feedback::Model) -> Reply {
    let mut text = format!(
        "💬 <b>Message from {}</b>\n{}\n\n{}",
        customer_line(&f.customer_name, f.telegram_username.as_deref()),
        f.created_at.format("%d.%m.%Y %H:%M"),
        escape_html(&f.message)
    );
    let mut rows = Vec::new();
    match (&f.admin_reply, f.is_replied) {
        (Some(reply), true) => {
            text.push_str(&format!("\n\n✅ <b>Your reply:</b>\n{}", escape_html(reply)));
        }
        _ => rows.push(vec![InlineButton::new(
            "↩️ Reply",
            CallbackCommand::ReplyToFeedback(f.id),
        )]),
    }
    rows.push(back_button("Back to feedback", CallbackCommand::AdminFeedback));
    Reply::with_markup(text, ReplyMarkup::inline(rows))
}

/// Prompt for the admin's answer.
#[must_use]
pub fn reply_prompt(f: &feedback::Model) -> Reply {
    Reply::with_markup(
        format!(
            "✍️ Write your reply to {}:\n\n<i>{}</i>",
            escape_html(&f.customer_name),
            escape_html(&f.message)
        ),
        back_keyboard(),
    )
}

/// Confirmation for the admin after an answer was stored and delivered.
#[must_use]
pub fn reply_sent(delivered: bool) -> Reply {
    let text = if delivered {
        "✅ Reply sent."
    } else {
        "⚠️ Reply saved, but it could not be delivered to the customer."
    };
    Reply::with_markup(text, main_keyboard(true))
}

/// Product management list.
#[must_use]
pub fn admin_products(products: &[product::Model]) -> Reply {
    let text = if products.is_empty() {
        "📦 <b>Products</b>\n\nThe catalog is empty.".to_string()
    } else {
        format!(
            "📦 <b>Products</b> ({})\n\nPress a product to delete it.",
            products.len()
        )
    };
    let mut rows: Vec<Vec<InlineButton>> = products
        .iter()
        .map(|p| {
            vec![InlineButton::new(
                format!("🗑 {} {} - {} ₽", p.emoji, p.name, format_price(p.price)),
                CallbackCommand::DeleteProduct(p.id),
            )]
        })
        .collect();
    rows.push(vec![InlineButton::new(
        "➕ Add product",
        CallbackCommand::AddProduct,
    )]);
    rows.push(back_button("Back", CallbackCommand::AdminMenu));
    Reply::with_markup(text, ReplyMarkup::inline(rows))
}

/// Confirmation after a product was removed.
#[must_use]
pub fn product_deleted(id: i64) -> Reply {
    Reply::text(format!("🗑 Product {id} deleted."))
}

// ---- add-product wizard ----

/// Wizard step 1.
#[must_use]
pub fn product_name_prompt() -> Reply {
    Reply::with_markup(
        "➕ <b>New product</b>\n\nStep 1/4: send the product name.",
        back_keyboard(),
    )
}

/// Wizard step 2.
#[must_use]
pub fn product_description_prompt(name: &str) -> Reply {
    Reply::text(format!(
        "Name: <b>{}</b>\n\nStep 2/4: send the description.",
        escape_html(name)
    ))
}

/// Wizard step 3.
#[must_use]
pub fn product_price_prompt() -> Reply {
    Reply::text("Step 3/4: send the price as a whole number, e.g. 1500.")
}

/// Re-prompt after an unparseable price.
#[must_use]
pub fn invalid_price() -> Reply {
    Reply::text("❌ The price must be a whole number, e.g. 1500. Please try again.")
}

/// Wizard step 4.
#[must_use]
pub fn product_emoji_prompt(price: i64) -> Reply {
    Reply::text(format!(
        "Price: <b>{} ₽</b>\n\nStep 4/4: send an emoji for the product.",
        format_price(price)
    ))
}

/// Wizard result.
#[must_use]
pub fn product_added(p: &product::Model) -> Reply {
    Reply::with_markup(
        format!(
            "✅ Product added: {} <b>{}</b> - {} ₽",
            escape_html(&p.emoji),
            escape_html(&p.name),
            format_price(p.price)
        ),
        main_keyboard(true),
    )
}
