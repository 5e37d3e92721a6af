use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error};

use crate::config::RelayConfig;

/// One outbound message to a recipient, exactly one kind per call.
///
/// Serializes to the relay's wire shape `{chat_id, type, ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub chat_id: String,
    #[serde(flatten)]
    pub kind: MessageKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageKind {
    Text { text: String },
    Photo { photo_url: String, caption: String },
    Sticker { sticker_id: String },
}

/// Client for the messaging relay's send endpoint.
///
/// Failures are logged and reported as `false`; nothing here ever raises to
/// its caller, so a dead relay degrades to silence instead of crashing a
/// background task.
pub struct Sender {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Sender {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.send_timeout_secs),
        }
    }

    pub async fn send(&self, message: &OutgoingMessage) -> bool {
        let url = format!("{}/send-message", self.base_url);
        debug!("Sending {} message to {}", kind_name(&message.kind), message.chat_id);

        match self
            .client
            .post(&url)
            .json(message)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!(
                    "Relay rejected send to {}: {}",
                    message.chat_id,
                    response.status()
                );
                false
            }
            Err(e) => {
                error!("Relay send to {} failed: {}", message.chat_id, e);
                false
            }
        }
    }

    pub async fn send_text(&self, chat_id: &str, text: &str) -> bool {
        self.send(&OutgoingMessage {
            chat_id: chat_id.to_string(),
            kind: MessageKind::Text {
                text: text.to_string(),
            },
        })
        .await
    }
}

fn kind_name(kind: &MessageKind) -> &'static str {
    match kind {
        MessageKind::Text { .. } => "text",
        MessageKind::Photo { .. } => "photo",
        MessageKind::Sticker { .. } => "sticker",
    }
}
