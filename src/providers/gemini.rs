use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::providers::{openai, Answer, Provider, ProviderError};

/// Secondary AI service, reached through its OpenAI-compatible endpoint.
pub struct Gemini {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl Gemini {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn ask(&self, query: &str) -> Result<Answer, ProviderError> {
        openai::ask(&self.client, &self.config, self.name(), query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        let provider = Gemini::new(ProviderConfig {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: String::new(),
            timeout_secs: 45,
        });
        let err = provider.ask("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }
}
