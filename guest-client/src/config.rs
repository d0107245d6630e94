use log::warn;
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_MS: u64 = 2000;

/// Where and how the page talks to the invitation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on any single request, so a hung call surfaces as an
    /// error instead of an endless spinner.
    pub request_timeout: Duration,
    pub likes_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            likes_poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

impl ClientConfig {
    /// Reads `WEDDING_API_URL`, `WEDDING_API_TIMEOUT_SECS` and
    /// `WEDDING_LIKES_POLL_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let base_url = env::var("WEDDING_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(env_u64(
                "WEDDING_API_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            likes_poll_interval: Duration::from_millis(env_u64(
                "WEDDING_LIKES_POLL_MS",
                DEFAULT_POLL_MS,
            )),
        }
    }
}
