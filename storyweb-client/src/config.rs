//! Client configuration.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ClientConfig::api_base_url`].
pub const ENV_API_BASE_URL: &str = "STORYWEB_API_BASE_URL";
/// Environment variable disabling the response cache when set to a truthy value.
pub const ENV_SKIP_CACHE: &str = "STORYWEB_SKIP_CACHE";

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, without a trailing path (e.g. `https://www.wattpad.com/api/v3`).
    pub api_base_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Keep decoded responses in memory, keyed by URL, for the session's lifetime.
    pub cache_responses: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.wattpad.com/api/v3".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            cache_responses: true,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `STORYWEB_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from any variable source. Split out of
    /// [`from_env`](Self::from_env) so it can be driven without touching the
    /// process environment.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base) = lookup(ENV_API_BASE_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = base;
        }
        if let Some(skip) = lookup(ENV_SKIP_CACHE) {
            if is_truthy(&skip) {
                self.cache_responses = false;
            }
        }
        self
    }

    /// Checks the settings a transport cannot work without.
    pub fn validate(&self) -> ClientResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}
