//! POST /webhook: one Telegram update per request.
//!
//! Every well-formed request is acknowledged with HTTP 200, including updates the
//! bot ignores and events whose processing failed or timed out, so Telegram never
//! redelivers them.

use crate::{
    bot::{
        router::{self, Event},
        telegram::Update,
    },
    errors::Result,
    server::AppState,
};
use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use tracing::{debug, warn};

/// Response body for POST /webhook.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Whether the body was understood
    pub ok: bool,
    /// Parse error for malformed bodies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    const fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn rejected(error: String) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }
}

/// Decodes one update from a webhook body.
///
/// # Errors
/// Returns [`crate::errors::Error::Json`] if the body is not a valid update.
pub fn parse_update(body: &[u8]) -> Result<Update> {
    Ok(serde_json::from_slice(body)?)
}

/// Handler for POST /webhook.
pub async fn receive(State(state): State<AppState>, body: Bytes) -> Json<WebhookAck> {
    let update = match parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return Json(WebhookAck::rejected(e.to_string()));
        }
    };

    let update_id = update.update_id;
    let Some(event) = Event::from_update(update) else {
        debug!(update_id, "update carries nothing to handle");
        return Json(WebhookAck::accepted());
    };

    if tokio::time::timeout(state.event_timeout, router::dispatch(&state.bot, &event))
        .await
        .is_err()
    {
        warn!(
            update_id,
            chat_id = event.chat_id(),
            timeout_secs = state.event_timeout.as_secs(),
            "event processing timed out"
        );
    }
    Json(WebhookAck::accepted())
}
