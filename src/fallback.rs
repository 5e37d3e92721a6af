use std::sync::Arc;

use tracing::{info, warn};

use crate::providers::{Answer, Provider, ProviderError};

/// Ordered list of providers tried in sequence for free-chat messages.
///
/// Strictly sequential, short-circuits on the first success, skips
/// unconfigured providers, never retries. When every provider fails the
/// caller gets a single `Exhausted` error; the per-provider details only
/// reach the logs.
pub struct FallbackChain {
    providers: Vec<Arc<dyn Provider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn ask(&self, query: &str) -> Result<Answer, ProviderError> {
        for provider in &self.providers {
            if !provider.is_configured() {
                info!("Fallback: skipping unconfigured provider {}", provider.name());
                continue;
            }
            match provider.ask(query).await {
                Ok(answer) => {
                    info!("Fallback: {} answered", provider.name());
                    return Ok(answer);
                }
                Err(e) => {
                    warn!("Fallback: {} failed: {}", provider.name(), e);
                }
            }
        }
        Err(ProviderError::Exhausted)
    }
}
