//! Configuration management for the beacon tracking-pixel service.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out-of-the-box with defaults: no notification endpoint,
/// no remote image, no signature requirement. Every view then simply serves
/// the embedded pixel.
///
/// # Example
///
/// ```no_run
/// use beacon::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Notification
    /// Notification endpoint URL, e.g. `https://ntfy.sh/your-topic`.
    ///
    /// When absent the notification step is skipped entirely.
    ///
    /// Environment variable: `NTFY_URL`
    #[serde(default, alias = "NTFY_URL")]
    pub ntfy_url: Option<String>,
    /// Timeout for the notification POST in seconds.
    ///
    /// Environment variable: `NOTIFY_TIMEOUT_SECONDS`
    #[serde(default = "default_notify_timeout", alias = "NOTIFY_TIMEOUT_SECONDS")]
    pub notify_timeout_seconds: u64,

    // Image origin
    /// Remote image origin URL.
    ///
    /// When set, views are answered with this image (fetched once and cached
    /// in memory). When absent, every view is answered with the embedded
    /// 1x1 pixel.
    ///
    /// Environment variable: `IMAGE_URL`
    #[serde(default, alias = "IMAGE_URL")]
    pub image_url: Option<String>,
    /// Timeout for the image origin fetch in seconds.
    ///
    /// Environment variable: `FETCH_TIMEOUT_SECONDS`
    #[serde(default = "default_fetch_timeout", alias = "FETCH_TIMEOUT_SECONDS")]
    pub fetch_timeout_seconds: u64,
    /// Maximum redirects to follow when fetching the image origin.
    ///
    /// Environment variable: `FETCH_MAX_REDIRECTS`
    #[serde(default = "default_max_redirects", alias = "FETCH_MAX_REDIRECTS")]
    pub fetch_max_redirects: u32,

    // Signature verification
    /// Shared secret for HMAC-SHA256 payload signatures.
    ///
    /// Environment variable: `SIGNING_SECRET`
    #[serde(default, alias = "SIGNING_SECRET")]
    pub signing_secret: Option<String>,
    /// Whether payloads must carry a valid signature suffix.
    ///
    /// Environment variable: `REQUIRE_SIGNATURE`
    #[serde(default, alias = "REQUIRE_SIGNATURE")]
    pub require_signature: bool,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (e.g., `NTFY_URL`, `PORT`)
    /// 2. Configuration file (`config.toml`)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Timeout for the notification POST.
    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_seconds)
    }

    /// Timeout for the image origin fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.notify_timeout_seconds == 0 {
            anyhow::bail!("notify_timeout_seconds must be greater than 0");
        }

        if self.fetch_timeout_seconds == 0 {
            anyhow::bail!("fetch_timeout_seconds must be greater than 0");
        }

        if self.require_signature && self.signing_secret.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!("require_signature is set but signing_secret is missing");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            ntfy_url: None,
            notify_timeout_seconds: default_notify_timeout(),
            image_url: None,
            fetch_timeout_seconds: default_fetch_timeout(),
            fetch_max_redirects: default_max_redirects(),
            signing_secret: None,
            require_signature: false,
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_notify_timeout() -> u64 {
    5
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_redirects() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.ntfy_url.is_none());
        assert!(config.image_url.is_none());
        assert!(!config.require_signature);
    }

    #[test]
    fn config_with_env_overrides() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("HOST", "0.0.0.0");
        guard.set_var("PORT", "9090");
        guard.set_var("NTFY_URL", "https://ntfy.sh/beacon-views");
        guard.set_var("IMAGE_URL", "https://images.example.com/logo.png");
        guard.set_var("NOTIFY_TIMEOUT_SECONDS", "3");
        guard.set_var("FETCH_TIMEOUT_SECONDS", "20");

        let config = Config::load().expect("Config should load with env overrides");

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.ntfy_url.as_deref(), Some("https://ntfy.sh/beacon-views"));
        assert_eq!(config.image_url.as_deref(), Some("https://images.example.com/logo.png"));
        assert_eq!(config.notify_timeout(), Duration::from_secs(3));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn signature_mode_requires_secret() {
        let mut config = Config::default();
        config.require_signature = true;
        assert!(config.validate().is_err());

        config.signing_secret = Some(String::new());
        assert!(config.validate().is_err());

        config.signing_secret = Some("s3cret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_config_validation_fails() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.notify_timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.fetch_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("Should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }
}
