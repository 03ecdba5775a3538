//! Core business logic - framework-agnostic catalog, order and feedback operations.
//!
//! Nothing in here knows about Telegram or HTTP; the bot layer and the admin API
//! both call into these functions with a `DatabaseConnection`.

/// Support messages and admin replies
pub mod feedback;
/// Order lifecycle: creation, status transitions, listings
pub mod order;
/// Catalog maintenance
pub mod product;

/// Identity of the person placing an order or writing to support.
///
/// In private chats the Telegram user id is also the chat id, which is how later
/// notifications find their way back to the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Telegram user id
    pub user_id: i64,
    /// Telegram `@username`, when set
    pub username: Option<String>,
    /// First name (or a placeholder when Telegram omits it)
    pub display_name: String,
}
