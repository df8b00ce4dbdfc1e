use std::time::Duration;

use crate::error::ConfigError;

/// Default autosave debounce, matching the web editor.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 3_000;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the API prefix, without a trailing slash.
    pub api_url: String,
    /// Bearer token from a previous verification, if any.
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Delay between the first unsaved edit and the automatic flush.
    pub autosave_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api/v1".into(),
            token: None,
            request_timeout_secs: 30,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                        |
    /// |-----------------------------|--------------------------------|
    /// | `WIKI_API_URL`              | `http://localhost:8000/api/v1` |
    /// | `WIKI_TOKEN`                | unset                          |
    /// | `WIKI_REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `WIKI_AUTOSAVE_DELAY_MS`    | `3000`                         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("WIKI_API_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidVar {
                var: "WIKI_API_URL",
                expected: "an http(s) URL",
                value: api_url,
            });
        }

        let token = lookup("WIKI_TOKEN").filter(|t| !t.trim().is_empty());

        let request_timeout_secs =
            parse_u64(&lookup, "WIKI_REQUEST_TIMEOUT_SECS")?.unwrap_or(defaults.request_timeout_secs);

        let autosave_delay_ms =
            parse_u64(&lookup, "WIKI_AUTOSAVE_DELAY_MS")?.unwrap_or(defaults.autosave_delay_ms);

        Ok(Self {
            api_url,
            token,
            request_timeout_secs,
            autosave_delay_ms,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar {
                var,
                expected: "a non-negative integer",
                value,
            }),
    }
}
