//! Inline button payloads.
//!
//! Payloads travel as `<tag>` or `<tag>_<id>` strings (`admin_orders`,
//! `order_accept_12`, `product_3`). They are parsed exactly once into a
//! [`CallbackCommand`]: the trailing numeric argument is split off and the remaining
//! tag must match in full, so `order_<id>` and `order_accept_<id>` can never be
//! confused with each other.

use crate::core::order::OrderStatus;
use std::fmt;

/// Every action an inline button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackCommand {
    /// Show a catalog item (`product_<id>`)
    ShowProduct(i64),
    /// Order a catalog item (`order_<id>`)
    PlaceOrder(i64),
    /// Return to the catalog (`back_catalog`)
    BackToCatalog,
    /// Admin start screen (`admin_menu`)
    AdminMenu,
    /// Admin order queue (`admin_orders`)
    AdminOrders,
    /// Admin view of one order (`admin_order_<id>`)
    AdminOrder(i64),
    /// Move an order to another status (`order_accept_<id>` and friends)
    SetOrderStatus {
        /// Target order
        order_id: i64,
        /// New status
        status: OrderStatus,
    },
    /// Product management list (`admin_products`)
    AdminProducts,
    /// Start the add-product wizard (`admin_add_product`)
    AddProduct,
    /// Remove a product (`admin_delete_product_<id>`)
    DeleteProduct(i64),
    /// Feedback inbox (`admin_feedback`)
    AdminFeedback,
    /// One feedback message (`admin_feedback_<id>`)
    AdminFeedbackItem(i64),
    /// Start the reply wizard (`feedback_reply_<id>`)
    ReplyToFeedback(i64),
}

const fn status_tag(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "order_pending",
        OrderStatus::Accepted => "order_accept",
        OrderStatus::Processing => "order_process",
        OrderStatus::Completed => "order_complete",
        OrderStatus::Cancelled => "order_cancel",
    }
}

impl CallbackCommand {
    /// Parses a payload; `None` for anything this bot never produced.
    #[must_use]
    pub fn parse(payload: &str) -> Option<Self> {
        let (tag, arg) = match payload.rsplit_once('_') {
            Some((tag, digits))
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
            {
                (tag, Some(digits.parse::<i64>().ok()?))
            }
            _ => (payload, None),
        };

        let command = match (tag, arg) {
            ("product", Some(id)) => Self::ShowProduct(id),
            ("order", Some(id)) => Self::PlaceOrder(id),
            ("back_catalog", None) => Self::BackToCatalog,
            ("admin_menu", None) => Self::AdminMenu,
            ("admin_orders", None) => Self::AdminOrders,
            ("admin_order", Some(id)) => Self::AdminOrder(id),
            ("admin_products", None) => Self::AdminProducts,
            ("admin_add_product", None) => Self::AddProduct,
            ("admin_delete_product", Some(id)) => Self::DeleteProduct(id),
            ("admin_feedback", None) => Self::AdminFeedback,
            ("admin_feedback", Some(id)) => Self::AdminFeedbackItem(id),
            ("feedback_reply", Some(id)) => Self::ReplyToFeedback(id),
            (tag, Some(order_id)) => {
                let status = OrderStatus::ALL
                    .into_iter()
                    .find(|status| status_tag(*status) == tag)?;
                Self::SetOrderStatus { order_id, status }
            }
            _ => return None,
        };
        Some(command)
    }

    /// Whether only the admin may trigger this command.
    #[must_use]
    pub const fn is_admin_scoped(self) -> bool {
        !matches!(
            self,
            Self::ShowProduct(_) | Self::PlaceOrder(_) | Self::BackToCatalog
        )
    }
}

impl fmt::Display for CallbackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowProduct(id) => write!(f, "product_{id}"),
            Self::PlaceOrder(id) => write!(f, "order_{id}"),
            Self::BackToCatalog => f.write_str("back_catalog"),
            Self::AdminMenu => f.write_str("admin_menu"),
            Self::AdminOrders => f.write_str("admin_orders"),
            Self::AdminOrder(id) => write!(f, "admin_order_{id}"),
            Self::SetOrderStatus { order_id, status } => {
                write!(f, "{}_{order_id}", status_tag(*status))
            }
            Self::AdminProducts => f.write_str("admin_products"),
            Self::AddProduct => f.write_str("admin_add_product"),
            Self::DeleteProduct(id) => write!(f, "admin_delete_product_{id}"),
            Self::AdminFeedback => f.write_str("admin_feedback"),
            Self::AdminFeedbackItem(id) => write!(f, "admin_feedback_{id}"),
            Self::ReplyToFeedback(id) => write!(f, "feedback_reply_{id}"),
        }
    }
}
