//! Configuration types for musicgpt-nodes

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Base URL used when the credentials do not override it
pub const DEFAULT_BASE_URL: &str = "https://api.musicgpt.com";

/// Versioned path prefix shared by every endpoint
pub const API_PREFIX: &str = "/api/public/v1";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "MUSICGPT_API_KEY";

/// Environment variable holding an optional base URL override
pub const BASE_URL_ENV: &str = "MUSICGPT_BASE_URL";

/// Stored credential: API key plus optional base URL override
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// API key, sent as the `Authorization` header on every call
    pub api_key: String,

    /// Base URL override (default: https://api.musicgpt.com)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Credentials {
    /// Credentials for the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Effective base URL without a trailing slash
    ///
    /// An empty override falls back to [`DEFAULT_BASE_URL`].
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    /// Load credentials from `MUSICGPT_API_KEY` and `MUSICGPT_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| Error::Config {
            message: format!("{API_KEY_ENV} is not set"),
            key: Some("api_key".to_string()),
        })?;
        let base_url = std::env::var(BASE_URL_ENV).ok();

        let credentials = Self { api_key, base_url };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Check the key is present and the base URL is an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config {
                message: "API key must not be empty".to_string(),
                key: Some("api_key".to_string()),
            });
        }

        let base_url = self.base_url();
        let parsed = url::Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{base_url}': {e}"),
            key: Some("base_url".to_string()),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("base URL must use http or https, got '{}'", parsed.scheme()),
                key: Some("base_url".to_string()),
            });
        }

        Ok(())
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Poll scheduler settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Time between polls in seconds (default: 60)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// API credentials
    pub credentials: Credentials,

    /// HTTP client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Poll scheduler settings
    #[serde(default)]
    pub polling: PollingConfig,
}

impl Config {
    /// Configuration with default client and polling settings
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Default::default()
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;

        if self.client.timeout.is_zero() {
            return Err(Error::Config {
                message: "timeout must be greater than zero".to_string(),
                key: Some("timeout".to_string()),
            });
        }

        if self.polling.interval.is_zero() {
            return Err(Error::Config {
                message: "poll interval must be greater than zero".to_string(),
                key: Some("interval".to_string()),
            });
        }

        Ok(())
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("musicgpt-nodes/{}", env!("CARGO_PKG_VERSION"))
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
