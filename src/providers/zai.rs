use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::ProviderConfig;
use crate::providers::{
    classify_transport_error, describe_status, Answer, Citation, Provider, ProviderError,
};

/// Platform-native AI service. Unlike the other providers it does not speak
/// the OpenAI dialect: the request is `{model, query}` and the answer comes
/// back in a top-level `answer` field.
pub struct Zai {
    client: reqwest::Client,
    config: ProviderConfig,
}

#[derive(Debug, Serialize)]
struct AskRequest {
    model: String,
    query: String,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    citations: Vec<Citation>,
}

impl Zai {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Provider for Zai {
    fn name(&self) -> &str {
        "zai"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn ask(&self, query: &str) -> Result<Answer, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::MissingCredential);
        }

        let request = AskRequest {
            model: self.config.model.clone(),
            query: query.to_string(),
        };

        let url = format!("{}/ask", self.config.base_url);
        debug!("Asking zai: {}", url);

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
            error!("Zai refused ({}): {}", status, body);
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                detail: describe_status(status.as_u16()).to_string(),
            });
        }

        let parsed: AskResponse = response
            .json()
            .await
            .map_err(|_| ProviderError::MalformedResponse)?;

        let text = parsed.answer.ok_or(ProviderError::MalformedResponse)?;

        Ok(Answer {
            text,
            citations: parsed.citations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        let provider = Zai::new(ProviderConfig {
            model: "zai-chat".to_string(),
            base_url: "https://bot-api.zaloplatforms.com/ai/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 45,
        });
        let err = provider.ask("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }

    #[test]
    fn test_answer_shape() {
        let parsed: AskResponse =
            serde_json::from_str(r#"{"answer": "hello there"}"#).unwrap();
        assert_eq!(parsed.answer.as_deref(), Some("hello there"));
        assert!(parsed.citations.is_empty());
    }

    #[test]
    fn test_missing_answer_field() {
        let parsed: AskResponse = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(parsed.answer.is_none());
    }
}
