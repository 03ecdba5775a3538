//! Unified error type for the shop bot.
//!
//! Every fallible operation in the crate returns [`Result`]. Handlers decide per
//! variant what the user sees: lookups that miss become "not found" notices,
//! store failures become a generic "try again later" notice.

use thiserror::Error;

/// All errors produced by the service.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The relational store rejected a query or is unreachable.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// `config.toml` could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON (de)serialization failure, e.g. a malformed webhook body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure while talking to the Bot API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered but refused the request.
    #[error("Telegram API error: {message}")]
    Telegram {
        /// Description returned by the API
        message: String,
    },

    /// No order with this id.
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Requested order id
        id: i64,
    },

    /// No product with this id.
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// No feedback message with this id.
    #[error("Feedback message not found: {id}")]
    FeedbackNotFound {
        /// Requested feedback id
        id: i64,
    },

    /// Unknown order status string.
    #[error("Invalid order status: {status}")]
    InvalidStatus {
        /// The rejected value
        status: String,
    },

    /// Price input that is not a non-negative integer.
    #[error("Invalid price: {input}")]
    InvalidPrice {
        /// The rejected value
        input: String,
    },
}

impl Error {
    /// Returns true for lookups that missed, which are reported to users rather than logged as failures.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::OrderNotFound { .. } | Self::ProductNotFound { .. } | Self::FeedbackNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
