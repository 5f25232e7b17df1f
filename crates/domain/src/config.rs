//! Configuration structures
//!
//! Provider/webhook/database settings are loaded once at startup (see the
//! infra config loader) and passed into the components that need them; no
//! mutable global state.

use serde::{Deserialize, Serialize};

/// Default provider API base URL.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.cal.com";

/// Default display timezone forwarded to the provider.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Scheduling provider API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_timezone: String,
}

/// Inbound webhook verification settings
///
/// An empty `secret` disables signature verification entirely. That mode is
/// only honoured when `allow_insecure` is set; the loader refuses to start
/// otherwise, so the permissive mode is always an explicit operator choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub secret: String,
    #[serde(default)]
    pub allow_insecure: bool,
}

impl WebhookConfig {
    /// Whether signature verification is effectively disabled.
    pub fn is_insecure(&self) -> bool {
        self.secret.is_empty()
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "127.0.0.1:8787".to_string() }
    }
}
