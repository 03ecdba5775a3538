//! Telegram Bot API surface: inbound update types, outbound reply markup and the
//! [`Notifier`] seam used by every handler to talk back to a chat.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest of the update.

use crate::{
    bot::callback::CallbackCommand,
    config::settings::NotificationSettings,
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::{
    RetryIf,
    strategy::{ExponentialBackoff, jitter},
};
use tracing::{debug, warn};

/// Root object of a webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic id assigned by Telegram
    #[serde(default)]
    pub update_id: i64,
    /// A new incoming message
    pub message: Option<Message>,
    /// An inline button press
    pub callback_query: Option<CallbackQuery>,
}

/// Incoming message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message id within the chat
    #[serde(default)]
    pub message_id: i64,
    /// Chat the message belongs to
    pub chat: Chat,
    /// Sender; absent for channel posts
    pub from: Option<User>,
    /// Text for text messages
    pub text: Option<String>,
}

/// Chat reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat id; equals the user id in private chats
    pub id: i64,
}

/// Telegram user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User id
    pub id: i64,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Public handle without the `@`
    #[serde(default)]
    pub username: Option<String>,
}

/// Inline button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Query id
    pub id: String,
    /// Who pressed the button
    pub from: User,
    /// Message carrying the keyboard
    pub message: Option<Message>,
    /// The button's callback payload
    pub data: Option<String>,
}

/// One button of a persistent reply keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    /// Label, sent back verbatim as message text when pressed
    pub text: String,
}

/// One button of an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    /// Label
    pub text: String,
    /// Payload delivered in the callback query
    pub callback_data: String,
}

impl InlineButton {
    /// Button that triggers `command` when pressed.
    #[must_use]
    pub fn new(text: impl Into<String>, command: CallbackCommand) -> Self {
        Self {
            text: text.into(),
            callback_data: command.to_string(),
        }
    }
}

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    /// Persistent keyboard replacing the phone keyboard
    Keyboard {
        /// Rows of labels
        keyboard: Vec<Vec<KeyboardButton>>,
        /// Let the client shrink the keyboard to fit
        resize_keyboard: bool,
    },
    /// Buttons attached under the message
    Inline {
        /// Rows of buttons
        inline_keyboard: Vec<Vec<InlineButton>>,
    },
}

impl ReplyMarkup {
    /// Reply keyboard from rows of labels.
    #[must_use]
    pub fn keyboard(rows: &[&[&str]]) -> Self {
        Self::Keyboard {
            keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: (*label).to_string(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }

    /// Inline keyboard from rows of buttons.
    #[must_use]
    pub const fn inline(rows: Vec<Vec<InlineButton>>) -> Self {
        Self::Inline {
            inline_keyboard: rows,
        }
    }
}

/// A message ready to be delivered: HTML text plus an optional keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTML-formatted body
    pub text: String,
    /// Keyboard to attach
    pub markup: Option<ReplyMarkup>,
}

impl Reply {
    /// Plain message without keyboard.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
        }
    }

    /// Message with a keyboard.
    #[must_use]
    pub fn with_markup(text: impl Into<String>, markup: ReplyMarkup) -> Self {
        Self {
            text: text.into(),
            markup: Some(markup),
        }
    }

    /// Inline button rows, empty for other markups.
    #[must_use]
    pub fn inline_rows(&self) -> &[Vec<InlineButton>] {
        match &self.markup {
            Some(ReplyMarkup::Inline { inline_keyboard }) => inline_keyboard,
            _ => &[],
        }
    }

    /// Every inline callback payload, row by row.
    #[must_use]
    pub fn callback_payloads(&self) -> Vec<&str> {
        self.inline_rows()
            .iter()
            .flatten()
            .map(|button| button.callback_data.as_str())
            .collect()
    }

    /// Every reply-keyboard label, row by row.
    #[must_use]
    pub fn keyboard_labels(&self) -> Vec<&str> {
        match &self.markup {
            Some(ReplyMarkup::Keyboard { keyboard, .. }) => keyboard
                .iter()
                .flatten()
                .map(|button| button.text.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Escapes text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Delivers replies to chats.
///
/// The result is explicit: callers decide whether a failed delivery is worth more
/// than a log line.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `reply` to `chat_id`.
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

impl<'a> SendMessageRequest<'a> {
    fn new(chat_id: i64, reply: &'a Reply) -> Self {
        Self {
            chat_id,
            text: reply.text.as_str(),
            parse_mode: "HTML",
            reply_markup: reply.markup.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// [`Notifier`] backed by the Bot API `sendMessage` method.
///
/// Transport errors, rate limiting and server errors are retried with exponential
/// backoff; a request the API rejects outright is not.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    retry: NotificationSettings,
}

impl TelegramNotifier {
    /// Creates a notifier for the bot identified by `token`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: &str, retry: NotificationSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            api_base: format!("https://api.telegram.org/bot{token}"),
            retry,
        })
    }

    fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBackoff::from_millis(2)
            .factor((self.retry.retry_base_delay_ms / 2).max(1))
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.retry.max_retries)
    }

    async fn send_once(&self, request: &SendMessageRequest<'_>) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.api_base))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(response.error_for_status().err().map_or_else(
                || Error::Telegram {
                    message: format!("HTTP {status}"),
                },
                Error::Http,
            ));
        }

        let body: ApiResponse = response.json().await?;
        if body.ok {
            Ok(())
        } else {
            Err(Error::Telegram {
                message: body
                    .description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            })
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        let request = SendMessageRequest::new(chat_id, reply);
        let request = &request;
        RetryIf::spawn(
            self.backoff(),
            move || async move {
                let result = self.send_once(request).await;
                if let Err(e) = &result {
                    warn!(chat_id, error = %e, "sendMessage attempt failed");
                }
                result
            },
            |e: &Error| matches!(e, Error::Http(_)),
        )
        .await?;
        debug!(chat_id, "message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_message_update() {
        let raw = json!({
            "update_id": 10,
            "message": {
                "message_id": 3,
                "chat": {"id": 555, "type": "private"},
                "from": {"id": 555, "is_bot": false, "first_name": "Ann", "username": "ann"},
                "date": 1_700_000_000,
                "text": "/start"
            }
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 555);
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert_eq!(message.from.unwrap().username.as_deref(), Some("ann"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_parse_callback_update() {
        let raw = json!({
            "update_id": 11,
            "callback_query": {
                "id": "abc",
                "from": {"id": 9, "first_name": "Bob"},
                "message": {"message_id": 1, "chat": {"id": 9}},
                "data": "product_4"
            }
        });
        let update: Update = serde_json::from_value(raw).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("product_4"));
        assert_eq!(query.message.unwrap().chat.id, 9);
        assert_eq!(query.from.username, None);
    }

    #[test]
    fn test_send_message_request_shape() {
        let reply = Reply::with_markup(
            "<b>Hi</b>",
            ReplyMarkup::inline(vec![vec![InlineButton::new(
                "Orders",
                CallbackCommand::AdminOrders,
            )]]),
        );
        let body = serde_json::to_value(SendMessageRequest::new(42, &reply)).unwrap();
        assert_eq!(
            body,
            json!({
                "chat_id": 42,
                "text": "<b>Hi</b>",
                "parse_mode": "HTML",
                "reply_markup": {
                    "inline_keyboard": [[{"text": "Orders", "callback_data": "admin_orders"}]]
                }
            })
        );

        let plain = Reply::text("plain");
        let body = serde_json::to_value(SendMessageRequest::new(1, &plain)).unwrap();
        assert!(body.get("reply_markup").is_none());
    }

    #[test]
    fn test_reply_keyboard_shape() {
        let markup = ReplyMarkup::keyboard(&[&["A"], &["B", "C"]]);
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "keyboard": [[{"text": "A"}], [{"text": "B"}, {"text": "C"}]],
                "resize_keyboard": true
            })
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }
}
