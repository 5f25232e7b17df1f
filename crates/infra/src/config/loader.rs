//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CALBRIDGE_DB_PATH`: SQLite database file path (required)
//! - `CALBRIDGE_DB_POOL_SIZE`: Connection pool size (default: 5)
//! - `CALBRIDGE_PROVIDER_BASE_URL`: Provider API base URL (default:
//!   `https://api.cal.com`)
//! - `CALBRIDGE_PROVIDER_API_KEY`: Provider API key (required)
//! - `CALBRIDGE_DEFAULT_TIMEZONE`: Timezone forwarded to the provider
//!   (default: `America/New_York`)
//! - `CALBRIDGE_WEBHOOK_SECRET`: Shared secret for webhook signatures
//! - `CALBRIDGE_ALLOW_INSECURE_WEBHOOKS`: Permit an empty webhook secret
//!   (true/false, default false)
//! - `CALBRIDGE_BIND_ADDR`: HTTP listen address (default: `127.0.0.1:8787`)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./calbridge.json` or `./calbridge.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use calbridge_domain::{
    CalBridgeError, Config, DatabaseConfig, ProviderConfig, Result, ServerConfig, WebhookConfig,
    DEFAULT_PROVIDER_BASE_URL, DEFAULT_TIMEZONE,
};

const DEFAULT_POOL_SIZE: u32 = 5;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
/// Either way the result passes [`validate`] before being returned.
///
/// # Errors
/// Returns `CalBridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or inconsistent
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `CALBRIDGE_DB_PATH` and `CALBRIDGE_PROVIDER_API_KEY` must be present;
/// everything else falls back to a default.
///
/// # Errors
/// Returns `CalBridgeError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("CALBRIDGE_DB_PATH")?;
    let db_pool_size = match std::env::var("CALBRIDGE_DB_POOL_SIZE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| CalBridgeError::Config(format!("Invalid pool size: {}", e)))?,
        Err(_) => DEFAULT_POOL_SIZE,
    };

    let api_key = env_var("CALBRIDGE_PROVIDER_API_KEY")?;
    let base_url = std::env::var("CALBRIDGE_PROVIDER_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string());
    let default_timezone = std::env::var("CALBRIDGE_DEFAULT_TIMEZONE")
        .unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());

    let webhook_secret = std::env::var("CALBRIDGE_WEBHOOK_SECRET").unwrap_or_default();
    let allow_insecure = env_bool("CALBRIDGE_ALLOW_INSECURE_WEBHOOKS", false);

    let bind_addr = std::env::var("CALBRIDGE_BIND_ADDR")
        .unwrap_or_else(|_| ServerConfig::default().bind_addr);

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        provider: ProviderConfig { base_url, api_key, default_timezone },
        webhook: WebhookConfig { secret: webhook_secret, allow_insecure },
        server: ServerConfig { bind_addr },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CalBridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalBridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CalBridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CalBridgeError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalBridgeError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalBridgeError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CalBridgeError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Reject configurations an operator almost certainly did not intend.
///
/// An empty webhook secret turns signature verification off, so it must be
/// paired with the explicit `allow_insecure` opt-in.
pub fn validate(config: &Config) -> Result<()> {
    if config.webhook.is_insecure() && !config.webhook.allow_insecure {
        return Err(CalBridgeError::Config(
            "webhook secret is empty; set CALBRIDGE_WEBHOOK_SECRET or opt in with \
             CALBRIDGE_ALLOW_INSECURE_WEBHOOKS"
                .to_string(),
        ));
    }

    if config.provider.api_key.is_empty() {
        return Err(CalBridgeError::Config("provider API key must not be empty".to_string()));
    }

    if config.database.pool_size == 0 {
        return Err(CalBridgeError::Config("database pool size must be at least 1".to_string()));
    }

    Ok(())
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent levels, and the
/// executable's directory for `config.{json,toml}` / `calbridge.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("calbridge.json"),
            cwd.join("calbridge.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("calbridge.json"),
                exe_dir.join("calbridge.toml"),
                exe_dir.join("../config.json"),
                exe_dir.join("../config.toml"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CalBridgeError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
