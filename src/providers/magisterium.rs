use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::ProviderConfig;
use crate::providers::{
    classify_transport_error, describe_status, Answer, Citation, Provider, ProviderError,
};

/// Primary AI service. OpenAI-compatible chat completions, plus a
/// `citations` array of source documents on the response.
pub struct Magisterium {
    client: reqwest::Client,
    config: ProviderConfig,
}

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
    #[serde(default)]
    citations: Vec<Citation>,
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

impl Magisterium {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Provider for Magisterium {
    fn name(&self) -> &str {
        "magisterium"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn ask(&self, query: &str) -> Result<Answer, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::MissingCredential);
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: query.to_string(),
            }],
            stream: false,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!("Asking magisterium: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Magisterium refused ({}): {}", status, body);
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                detail: describe_status(status.as_u16()).to_string(),
            });
        }

        // A 2xx with an unexpected body is a content-extraction failure,
        // not a transport fault.
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

        Ok(Answer {
            text,
            citations: parsed.citations,
        })
    }
}
