use std::time::Duration;

use serde::{Deserialize, Serialize};

use herald_common::HeraldError;

use crate::{MessageSender, SendError};

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct BotReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API transport (`sendMessage`).
pub struct TelegramSender {
    client: reqwest::Client,
    send_url: String,
}

impl TelegramSender {
    /// `api_url` is the Bot API base, e.g. `https://api.telegram.org`.
    pub fn new(api_url: &str, bot_token: &str, timeout: Duration) -> Result<Self, HeraldError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/bot{}/sendMessage",
                api_url.trim_end_matches('/'),
                bot_token
            ),
        })
    }
}

impl MessageSender for TelegramSender {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), SendError> {
        // The URL embeds the bot token, keep it out of error messages.
        let response = self
            .client
            .post(&self.send_url)
            .json(&SendMessage { chat_id, text })
            .send()
            .await
            .map_err(|e| SendError::Transport(e.without_url()))?;

        let status = response.status();
        let reply = response.json::<BotReply>().await.ok();

        match reply {
            Some(BotReply { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotReply { description, .. }) => Err(SendError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(SendError::Rejected {
                status: status.as_u16(),
                description: "unreadable Bot API reply".to_string(),
            }),
        }
    }
}
