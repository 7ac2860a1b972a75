// src/services/telegram.rs

//! Telegram Bot API delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Action, OutboundMessage, RecipientId};
use crate::services::NotificationSink;

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Serialize)]
struct InlineButton {
    text: String,
    callback_data: String,
}

impl InlineKeyboard {
    /// One row with a button per action.
    fn from_actions(actions: &[Action]) -> Option<Self> {
        if actions.is_empty() {
            return None;
        }
        let row = actions
            .iter()
            .map(|a| InlineButton {
                text: a.kind.label().to_string(),
                callback_data: a.callback_data(),
            })
            .collect();
        Some(Self {
            inline_keyboard: vec![row],
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Telegram Bot API.
pub struct TelegramSink {
    client: Client,
    endpoint: String,
}

impl TelegramSink {
    /// Create a sink for a bot token against an API base URL.
    pub fn new(client: Client, api_base: &str, token: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token),
        }
    }

    /// Create a sink with the token from [`TOKEN_ENV`].
    pub fn from_env(client: Client, api_base: &str) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| AppError::config(format!("{TOKEN_ENV} is not set")))?;
        if token.trim().is_empty() {
            return Err(AppError::config(format!("{TOKEN_ENV} is empty")));
        }
        Ok(Self::new(client, api_base, token.trim()))
    }

    /// Errors never carry the request URL, which embeds the token.
    async fn send_message(&self, recipient: &RecipientId, payload: &SendMessage<'_>) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::delivery(recipient, e.without_url()))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| {
                AppError::delivery(recipient, format!("status {status}: {}", e.without_url()))
            })?;

        if !status.is_success() || !body.ok {
            let reason = body.description.unwrap_or_else(|| status.to_string());
            return Err(AppError::delivery(recipient, reason));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, recipient: &RecipientId, message: &OutboundMessage) -> Result<()> {
        let chat_id = recipient.as_str();

        match &message.body {
            Some(body) => {
                let headline = SendMessage {
                    chat_id,
                    text: &message.text,
                    parse_mode: Some("HTML"),
                    reply_markup: None,
                };
                self.send_message(recipient, &headline).await?;

                let detail = SendMessage {
                    chat_id,
                    text: body,
                    parse_mode: Some("HTML"),
                    reply_markup: InlineKeyboard::from_actions(&message.actions),
                };
                self.send_message(recipient, &detail).await
            }
            None => {
                let only = SendMessage {
                    chat_id,
                    text: &message.text,
                    parse_mode: Some("HTML"),
                    reply_markup: InlineKeyboard::from_actions(&message.actions),
                };
                self.send_message(recipient, &only).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> OutboundMessage {
        OutboundMessage {
            text: OutboundMessage::NEW_PUBLICATION.to_string(),
            body: Some("<b>Publicación #7</b>".to_string()),
            actions: vec![Action::new(ActionKind::Calendar, "7")],
        }
    }

    #[test]
    fn test_keyboard_layout() {
        let keyboard = InlineKeyboard::from_actions(&message().actions).unwrap();
        let json = serde_json::to_value(&keyboard).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inline_keyboard": [[
                    { "text": "Agregar al Calendario", "callback_data": "calendar_7" }
                ]]
            })
        );
        assert!(InlineKeyboard::from_actions(&[]).is_none());
    }

    #[tokio::test]
    async fn test_sends_headline_then_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({ "chat_id": "99" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(2)
            .mount(&server)
            .await;

        let sink = TelegramSink::new(Client::new(), &server.uri(), "TOKEN");
        sink.send(&RecipientId::from("99"), &message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_rejection_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&server)
            .await;

        let sink = TelegramSink::new(Client::new(), &server.uri(), "TOKEN");
        let err = sink
            .send(&RecipientId::from("99"), &message())
            .await
            .unwrap_err();
        match err {
            AppError::Delivery { recipient, message } => {
                assert_eq!(recipient, "99");
                assert!(message.contains("blocked"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let sink = TelegramSink::new(Client::new(), "http://127.0.0.1:9", "123456:SECRET_TOKEN");
        let err = sink
            .send(&RecipientId::from("1"), &message())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Delivery { .. }));
        assert!(!err.to_string().contains("SECRET_TOKEN"));
    }

    #[tokio::test]
    async fn test_malformed_reply_hides_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let sink = TelegramSink::new(Client::new(), &server.uri(), "123456:SECRET_TOKEN");
        let err = sink
            .send(&RecipientId::from("1"), &message())
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("502"));
        assert!(!text.contains("SECRET_TOKEN"));
    }
}
