//! Configuration types for dispatching requests

use crate::error::{BgRemovalError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the request timeout, in seconds (0 disables it)
pub const TIMEOUT_ENV: &str = "BGREMOVE_TIMEOUT_SECS";

/// Default total request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP settings used by the dispatcher's transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Total time allowed for one request, including reading the image (None = no limit)
    pub timeout: Option<Duration>,

    /// Time allowed to establish the connection
    pub connect_timeout: Duration,

    /// User-Agent sent with every request
    pub user_agent: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl DispatcherConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bgremove_api::DispatcherConfig;
    ///
    /// let config = DispatcherConfig::builder()
    ///     .timeout_secs(30)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.timeout, Some(std::time::Duration::from_secs(30)));
    /// ```
    #[must_use]
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::default()
    }

    /// Defaults, with overrides from the process environment
    ///
    /// # Errors
    /// - `BGREMOVE_TIMEOUT_SECS` is set but not a whole number
    pub fn from_env() -> Result<Self> {
        Self::builder()
            .apply_env(|key| std::env::var(key).ok())?
            .build()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Zero timeout (use `None` to disable)
    /// - Zero connect timeout
    /// - Empty user agent
    pub fn validate(&self) -> Result<()> {
        if self.timeout == Some(Duration::ZERO) {
            return Err(BgRemovalError::configuration(
                "request timeout must be positive (disable it instead of setting 0)",
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(BgRemovalError::configuration("connect timeout must be positive"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(BgRemovalError::configuration("user agent must not be empty"));
        }
        Ok(())
    }
}

/// Builder for `DispatcherConfig`
#[derive(Debug, Default)]
pub struct DispatcherConfigBuilder {
    config: DispatcherConfig,
}

impl DispatcherConfigBuilder {
    /// Set the total request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set the total request timeout in seconds; `0` disables it
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Wait for the service indefinitely
    #[must_use]
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Apply overrides from a variable lookup
    ///
    /// # Errors
    /// - The timeout variable is set but not a whole number
    pub fn apply_env<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(TIMEOUT_ENV) {
            Some(raw) if !raw.trim().is_empty() => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    BgRemovalError::configuration(format!(
                        "{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"
                    ))
                })?;
                Ok(self.timeout_secs(secs))
            },
            _ => Ok(self),
        }
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - Validation failures, see [`DispatcherConfig::validate`]
    pub fn build(self) -> Result<DispatcherConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
