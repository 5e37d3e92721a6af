pub mod gemini;
pub mod llama;
pub mod magisterium;
mod openai;
pub mod zai;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Uniform contract every upstream AI service is adapted to.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name, used in logs and the fallback chain.
    fn name(&self) -> &str;

    /// Whether this provider has a credential. Unconfigured providers are
    /// skipped by the fallback chain and fail fast on direct commands.
    fn is_configured(&self) -> bool;

    /// Ask a single-turn question and get the extracted answer.
    async fn ask(&self, query: &str) -> Result<Answer, ProviderError>;
}

/// A successful provider response.
#[derive(Debug, Clone, Default)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Answer {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

/// A source reference attached to an answer. Every field is optional
/// upstream and defaults to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Citation {
    #[serde(default, alias = "document_title")]
    pub title: String,
    #[serde(default, alias = "document_author")]
    pub author: String,
    #[serde(default, alias = "document_year")]
    pub year: String,
    #[serde(default, alias = "document_reference")]
    pub reference: String,
    #[serde(default)]
    pub source_url: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credential")]
    MissingCredential,
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response body")]
    MalformedResponse,
    /// Every provider in a fallback chain failed or was unconfigured.
    #[error("all providers exhausted")]
    Exhausted,
}

impl ProviderError {
    /// The message sent to the end user. Detailed classification stays in
    /// the logs; users get plain language.
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential => {
                "This assistant is not configured. Please contact the administrator."
            }
            ProviderError::Timeout => "The AI took too long to answer. Please try again.",
            ProviderError::Upstream { .. } => "The AI service rejected the request.",
            ProviderError::Network(_) => "Could not reach the AI service. Please try again.",
            ProviderError::MalformedResponse => {
                "Something went wrong reading the AI's answer."
            }
            ProviderError::Exhausted => {
                "All assistants are currently overloaded or unavailable. Please try again later."
            }
        }
    }
}

/// Classify a non-2xx status into an operator-facing label.
pub fn describe_status(status: u16) -> &'static str {
    match status {
        400 => "malformed or too-long input",
        401 => "credential rejected or billing issue",
        429 => "rate limited",
        s if s >= 500 => "upstream outage",
        _ => "unexpected upstream error",
    }
}

/// Map a reqwest transport error to the taxonomy. Timeouts are reported
/// distinctly from other network failures.
pub fn classify_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(err.to_string())
    }
}
