//! Backend configuration
//!
//! The hosted service needs two values: the project URL and the public anon
//! key. Both come from the environment (optionally via a `.env` file). When
//! either is missing the configuration reports itself as not configured
//! instead of failing later on the first request.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the service URL
pub const URL_VAR: &str = "LUNA_BACKEND_URL";
/// Environment variable holding the public anon key
pub const ANON_KEY_VAR: &str = "LUNA_BACKEND_ANON_KEY";
/// Environment variable holding the optional session persistence path
pub const SESSION_PATH_VAR: &str = "LUNA_SESSION_PATH";
/// Environment variable holding the optional HTTP timeout in seconds
pub const TIMEOUT_VAR: &str = "LUNA_HTTP_TIMEOUT_SECS";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// URL or anon key is absent
    #[error("Backend not configured: set LUNA_BACKEND_URL and LUNA_BACKEND_ANON_KEY")]
    NotConfigured,

    /// A value is present but unusable
    #[error("Invalid configuration value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base service URL (e.g., "https://project.example.co")
    pub url: String,
    /// Public anon key sent as `apikey` on every request
    pub anon_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Where to persist the session, if anywhere
    pub session_path: Option<PathBuf>,
}

impl BackendConfig {
    /// Create a config from explicit values
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("Luna/{}", env!("CARGO_PKG_VERSION")),
            session_path: None,
        }
    }

    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (url, anon_key) = match (non_empty(URL_VAR), non_empty(ANON_KEY_VAR)) {
            (Some(url), Some(key)) => (url, key),
            _ => return Err(ConfigError::NotConfigured),
        };

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: URL_VAR,
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }

        let mut config = Self::new(url, anon_key);

        if let Some(path) = non_empty(SESSION_PATH_VAR) {
            config.session_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = non_empty(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: TIMEOUT_VAR,
                reason: format!("not a number of seconds: {raw:?}"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Whether both required values are present
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Persist the session at the given path
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Base URL of the auth API
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// Base URL of the table API
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}
