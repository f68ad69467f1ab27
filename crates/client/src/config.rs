use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// An environment variable held a value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Backend client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Timeout applied to every HTTP request.
    pub request_timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration pointing at `api_url` with default settings.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: trim_base_url(api_url.into()),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `AICOOK_API_URL`              | `http://localhost:8000` |
    /// | `AICOOK_REQUEST_TIMEOUT_SECS` | `10`                    |
    /// | `AICOOK_USER_AGENT`           | `aicook/<version>`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("AICOOK_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "AICOOK_API_URL",
                value: api_url,
                expected: "an http(s) URL",
            });
        }

        let request_timeout_secs = match lookup("AICOOK_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "AICOOK_REQUEST_TIMEOUT_SECS",
                        value: raw,
                        expected: "a positive integer",
                    })
                }
            },
        };

        let user_agent = lookup("AICOOK_USER_AGENT")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            api_url: trim_base_url(api_url),
            request_timeout_secs,
            user_agent,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn default_user_agent() -> String {
    format!("aicook/{}", env!("CARGO_PKG_VERSION"))
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
