//! Client configuration.
//!
//! A [`Config`] is built once through [`ConfigBuilder`] and never changes
//! afterwards. All validation happens in [`ConfigBuilder::build`], before any
//! connection pool or socket exists.

use crate::error::API_KEY_PREFIX;
use crate::{Error, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.puxbay.com/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default number of idle pooled connections per host.
pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 10;

/// Default lifetime of an idle pooled connection.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(300);

/// Default unit of the exponential backoff schedule.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Configuration for a [`Client`](crate::Client).
///
/// # Examples
///
/// ```
/// use puxbay::Config;
/// use std::time::Duration;
///
/// let config = Config::builder("pb_test_abc123")
///     .timeout(Duration::from_secs(10))
///     .max_retries(5)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_retries(), 5);
/// assert_eq!(config.base_url().as_str(), "https://api.puxbay.com/api/v1");
/// ```
#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
    max_idle_connections: usize,
    keep_alive: Duration,
    backoff_base: Duration,
    backoff_jitter: bool,
    user_agent: String,
}

impl Config {
    /// Starts a builder for the given API key.
    pub fn builder(api_key: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(api_key)
    }

    /// The API key sent as `X-API-Key`.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL every endpoint is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Connect and total request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Idle pooled connections kept per host.
    pub fn max_idle_connections(&self) -> usize {
        self.max_idle_connections
    }

    /// How long an idle pooled connection is kept.
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Unit of the `2^n` backoff schedule.
    pub fn backoff_base(&self) -> Duration {
        self.backoff_base
    }

    /// Whether backoff delays are randomized.
    pub fn backoff_jitter(&self) -> bool {
        self.backoff_jitter
    }

    /// Value of the `User-Agent` header.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("max_idle_connections", &self.max_idle_connections)
            .field("keep_alive", &self.keep_alive)
            .field("backoff_base", &self.backoff_base)
            .field("backoff_jitter", &self.backoff_jitter)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn redact(api_key: &str) -> String {
    // keep the prefix so test and live keys stay distinguishable in logs
    let visible_len = API_KEY_PREFIX.len() + 4;
    if api_key.chars().count() <= visible_len {
        return "***".to_string();
    }
    let visible: String = api_key.chars().take(visible_len).collect();
    format!("{visible}***")
}

/// Builder for [`Config`].
#[derive(Clone)]
pub struct ConfigBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    max_idle_connections: usize,
    keep_alive: Duration,
    backoff_base: Duration,
    backoff_jitter: bool,
    user_agent: String,
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("max_idle_connections", &self.max_idle_connections)
            .field("keep_alive", &self.keep_alive)
            .field("backoff_base", &self.backoff_base)
            .field("backoff_jitter", &self.backoff_jitter)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ConfigBuilder {
    /// Creates a builder with the default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
            keep_alive: DEFAULT_KEEP_ALIVE,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_jitter: false,
            user_agent: concat!("puxbay-rust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Overrides the API base URL (e.g. a sandbox or a local mock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many times a retryable failure is re-issued. `0` disables retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the number of idle connections kept per host.
    pub fn max_idle_connections(mut self, max_idle_connections: usize) -> Self {
        self.max_idle_connections = max_idle_connections;
        self
    }

    /// Sets how long idle connections stay in the pool.
    pub fn keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets the unit of the backoff schedule: retry `n` waits `base * 2^n`.
    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Scales every backoff delay by a random factor between 0.5 and 1.0.
    pub fn backoff_jitter(mut self, jitter: bool) -> Self {
        self.backoff_jitter = jitter;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the settings and builds the [`Config`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidApiKey`] if the key does not start with `pb_`
    /// - [`Error::InvalidUrl`] if the base URL does not parse
    /// - [`Error::Configuration`] for a zero timeout, keep-alive or pool size,
    ///   or a URL that cannot carry paths
    pub fn build(self) -> Result<Config> {
        if !self.api_key.starts_with(API_KEY_PREFIX) {
            return Err(Error::InvalidApiKey);
        }

        let base_url = Url::parse(self.base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Base URL cannot carry a path: {}",
                self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::Configuration("Timeout must be non-zero".to_string()));
        }
        if self.keep_alive.is_zero() {
            return Err(Error::Configuration(
                "Keep-alive duration must be non-zero".to_string(),
            ));
        }
        if self.max_idle_connections == 0 {
            return Err(Error::Configuration(
                "Connection pool must allow at least one idle connection".to_string(),
            ));
        }

        Ok(Config {
            api_key: self.api_key,
            base_url,
            timeout: self.timeout,
            max_retries: self.max_retries,
            max_idle_connections: self.max_idle_connections,
            keep_alive: self.keep_alive,
            backoff_base: self.backoff_base,
            backoff_jitter: self.backoff_jitter,
            user_agent: self.user_agent,
        })
    }
}
