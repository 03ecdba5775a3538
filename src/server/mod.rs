//! HTTP surface: the Telegram webhook and the password-protected admin API.

/// REST endpoints for the web admin panel
pub mod admin_api;
/// Telegram update intake
pub mod webhook;

use crate::{bot::BotContext, errors::Result};
use axum::{Router, routing::post};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Conversation engine and its dependencies
    pub bot: Arc<BotContext>,
    /// Expected `X-Admin-Password` value
    pub admin_password: Arc<str>,
    /// Upper bound on processing one webhook event
    pub event_timeout: Duration,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("admin_password", &"<redacted>")
            .field("event_timeout", &self.event_timeout)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates the handler state.
    #[must_use]
    pub fn new(bot: Arc<BotContext>, admin_password: &str, event_timeout: Duration) -> Self {
        Self {
            bot,
            admin_password: Arc::from(admin_password),
            event_timeout,
        }
    }
}

/// Builds the full application router.
///
/// - POST /webhook
/// - /admin/orders, /admin/orders/{id}
/// - /admin/products, /admin/products/{id}
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook::receive))
        .merge(admin_api::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `bind_address` and serves until the process is stopped.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!("Listening on {bind_address}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
