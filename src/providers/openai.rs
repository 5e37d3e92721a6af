//! Shared request path for providers speaking the OpenAI-compatible
//! chat-completions dialect (gemini, llama).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::ProviderConfig;
use crate::providers::{
    classify_transport_error, describe_status, Answer, ProviderError,
};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Single-turn chat completion against `{base_url}/chat/completions`.
pub(super) async fn ask(
    client: &reqwest::Client,
    config: &ProviderConfig,
    provider_name: &str,
    query: &str,
) -> Result<Answer, ProviderError> {
    if !config.is_configured() {
        return Err(ProviderError::MissingCredential);
    }

    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: query.to_string(),
        }],
        stream: false,
    };

    let url = format!("{}/chat/completions", config.base_url);
    debug!("Asking {}: {}", provider_name, url);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await
        .map_err(classify_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("{} refused ({}): {}", provider_name, status, body);
        return Err(ProviderError::Upstream {
            status: status.as_u16(),
            detail: describe_status(status.as_u16()).to_string(),
        });
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|_| ProviderError::MalformedResponse)?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ProviderError::MalformedResponse)?;

    Ok(Answer::text_only(text))
}
