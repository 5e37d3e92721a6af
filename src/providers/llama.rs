use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::providers::{openai, Answer, Provider, ProviderError};

/// Tertiary AI service, an OpenAI-compatible hosted llama deployment.
pub struct Llama {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl Llama {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Provider for Llama {
    fn name(&self) -> &str {
        "llama"
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
        let provider = Llama::new(ProviderConfig {
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 45,
        });
        let err = provider.ask("hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }
}
