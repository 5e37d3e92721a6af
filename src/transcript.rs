use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::DashboardConfig;

#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    sender_id: &'a str,
    sender_name: &'a str,
    text: &'a str,
}

/// Best-effort transcript logging to the dashboard service.
///
/// The dashboard is a collaborator, not a dependency: no configured URL
/// means logging is off, and a failed post is a warning, never an error the
/// ingress path sees.
pub struct TranscriptLogger {
    client: reqwest::Client,
    base_url: Option<String>,
    timeout: Duration,
}

impl TranscriptLogger {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    pub async fn log(&self, sender_id: &str, sender_name: &str, text: &str) {
        let Some(base_url) = &self.base_url else {
            return;
        };

        let url = format!("{}/api/message/log", base_url);
        let entry = LogEntry {
            sender_id,
            sender_name,
            text,
        };

        match self
            .client
            .post(&url)
            .json(&entry)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!("Transcript logged for {}", sender_id);
            }
            Ok(response) => {
                warn!("Dashboard rejected transcript entry: {}", response.status());
            }
            Err(e) => {
                warn!("Failed to log transcript to dashboard: {}", e);
            }
        }
    }
}
