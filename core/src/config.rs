//! Endpoint and transport configuration.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_BASE: &str = "https://api.weibo.com";
pub const DEFAULT_UPLOAD_BASE: &str = "https://upload.api.weibo.com";
pub const DEFAULT_MESSAGE_BASE: &str = "https://m.api.weibo.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URLs of the three downstream hosts. Stored without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Profiles, timelines, counts, emotions, comments, plain status updates.
    pub api_base: String,
    /// Status updates that carry a picture.
    pub upload_base: String,
    /// Private message replies.
    pub message_base: String,
}

impl Endpoints {
    pub fn new(api_base: &str, upload_base: &str, message_base: &str) -> Self {
        Self {
            api_base: trim(api_base),
            upload_base: trim(upload_base),
            message_base: trim(message_base),
        }
    }

    /// Point every host at one base URL, e.g. a local mock server.
    pub fn single(base: &str) -> Self {
        Self::new(base, base, base)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE, DEFAULT_MESSAGE_BASE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoints: Endpoints,
    /// Global timeout for one outbound request, attachment fetches included.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    /// Read overrides from `WEIBO_API_BASE`, `WEIBO_UPLOAD_BASE`,
    /// `WEIBO_MESSAGE_BASE` and `WEIBO_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Endpoints::default();
        let base = |key: &str, default: String| lookup(key).map(|v| trim(&v)).unwrap_or(default);
        let endpoints = Endpoints {
            api_base: base("WEIBO_API_BASE", defaults.api_base),
            upload_base: base("WEIBO_UPLOAD_BASE", defaults.upload_base),
            message_base: base("WEIBO_MESSAGE_BASE", defaults.message_base),
        };

        let timeout = match lookup("WEIBO_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "ignoring invalid WEIBO_TIMEOUT_SECS");
                    DEFAULT_TIMEOUT
                }
            },
        };

        Self { endpoints, timeout }
    }
}

fn trim(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}
