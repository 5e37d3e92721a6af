use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Gateway configuration.
///
/// Non-secret settings come from a TOML file; credentials and the webhook
/// shared secret are overlaid from environment variables afterwards, so a
/// deployment with no config file at all still works.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Shared secret expected in the X-Bot-Api-Secret-Token header.
    #[serde(default)]
    pub webhook_secret: String,
    /// Optional admin chat id notified when the gateway comes online.
    #[serde(default)]
    pub admin_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Base URL of the messaging relay that performs the actual platform send.
    #[serde(default = "default_relay_url")]
    pub base_url: String,
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Transcript logging target; logging is disabled when unset.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_dashboard_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_magisterium")]
    pub magisterium: ProviderConfig,
    #[serde(default = "default_gemini")]
    pub gemini: ProviderConfig,
    #[serde(default = "default_llama")]
    pub llama: ProviderConfig,
    #[serde(default = "default_zai")]
    pub zai: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub model: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// A provider with no credential is disabled, never a load-time error.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Provider names tried in order for free-chat messages.
    #[serde(default = "default_fallback_order")]
    pub order: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Maximum concurrently in-flight background dispatches.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_bind() -> String {
    "0.0.0.0:5002".to_string()
}

fn default_relay_url() -> String {
    "http://zalo-flask-api:5001".to_string()
}

fn default_send_timeout() -> u64 {
    15
}

fn default_dashboard_timeout() -> u64 {
    2
}

fn default_magisterium() -> ProviderConfig {
    ProviderConfig {
        model: "magisterium-1".to_string(),
        base_url: "https://www.magisterium.com/api/v1".to_string(),
        api_key: String::new(),
        // Slow reasoning service; the others answer faster.
        timeout_secs: 60,
    }
}

fn default_gemini() -> ProviderConfig {
    ProviderConfig {
        model: "gemini-2.0-flash".to_string(),
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
        api_key: String::new(),
        timeout_secs: 45,
    }
}

fn default_llama() -> ProviderConfig {
    ProviderConfig {
        model: "llama-3.3-70b-versatile".to_string(),
        base_url: "https://api.groq.com/openai/v1".to_string(),
        api_key: String::new(),
        timeout_secs: 45,
    }
}

fn default_zai() -> ProviderConfig {
    ProviderConfig {
        model: "zai-chat".to_string(),
        base_url: "https://bot-api.zaloplatforms.com/ai/v1".to_string(),
        api_key: String::new(),
        timeout_secs: 45,
    }
}

fn default_fallback_order() -> Vec<String> {
    vec!["zai".to_string(), "gemini".to_string()]
}

fn default_max_in_flight() -> usize {
    32
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_dashboard_timeout(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: default_relay_url(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            magisterium: default_magisterium(),
            gemini: default_gemini(),
            llama: default_llama(),
            zai: default_zai(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            order: default_fallback_order(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay credentials and deployment URLs from the environment.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("BOT_API_SECRET_TOKEN") {
            self.webhook_secret = v;
        }
        if let Ok(v) = std::env::var("RELAY_API_URL") {
            self.relay.base_url = v;
        }
        if let Ok(v) = std::env::var("DASHBOARD_URL") {
            self.dashboard.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("ADMIN_ZALO_ID") {
            if !v.is_empty() {
                self.admin_id = Some(v);
            }
        }
        if let Ok(v) = std::env::var("MAGISTERIUM_API_KEY") {
            self.providers.magisterium.api_key = v;
        }
        if let Ok(v) = std::env::var("GEMINI_API_KEY") {
            self.providers.gemini.api_key = v;
        }
        if let Ok(v) = std::env::var("LLAMA_API_KEY") {
            self.providers.llama.api_key = v;
        }
        if let Ok(v) = std::env::var("ZAI_API_KEY") {
            self.providers.zai.api_key = v;
        }
    }

    /// Names of providers that have a credential, for the startup summary.
    pub fn configured_provider_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.providers.magisterium.is_configured() {
            names.push("magisterium");
        }
        if self.providers.gemini.is_configured() {
            names.push("gemini");
        }
        if self.providers.llama.is_configured() {
            names.push("llama");
        }
        if self.providers.zai.is_configured() {
            names.push("zai");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:5002");
        assert_eq!(config.relay.send_timeout_secs, 15);
        assert_eq!(config.providers.magisterium.timeout_secs, 60);
        assert_eq!(config.providers.gemini.timeout_secs, 45);
        assert_eq!(config.fallback.order, vec!["zai", "gemini"]);
        assert_eq!(config.dispatch.max_in_flight, 32);
        assert!(!config.providers.magisterium.is_configured());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            webhook_secret = "s3cret"

            [server]
            bind = "127.0.0.1:9000"

            [providers.gemini]
            model = "gemini-2.5-pro"
            api_key = "k"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.webhook_secret, "s3cret");
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.providers.gemini.model, "gemini-2.5-pro");
        assert!(config.providers.gemini.is_configured());
        // Untouched sections keep their defaults.
        assert_eq!(config.providers.magisterium.model, "magisterium-1");
        assert_eq!(config.relay.base_url, "http://zalo-flask-api:5001");
    }

    #[test]
    fn test_provider_without_key_is_disabled() {
        let config: Config = toml::from_str(
            r#"
            [providers.llama]
            model = "llama-3.3-70b-versatile"
            timeout_secs = 45
            "#,
        )
        .unwrap();
        assert!(!config.providers.llama.is_configured());
    }
}
