//! # Client Configuration
//!
//! Settings the session core needs from its host.
//!
//! ## Overview
//!
//! The only externally provided value is the backend API base URL. Native
//! hosts read it from the `API_BASE_URL` environment variable at startup;
//! browser builds bake it in at compile time (the same variable, captured with
//! `option_env!`). When unset, a local development address is used.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .api_base_url("https://api.modelcards.example")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(
//!     config.api_url("/api/v1/auth/logout"),
//!     "https://api.modelcards.example/api/v1/auth/logout"
//! );
//! ```

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Environment variable holding the backend API base URL.
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";

/// Base URL used when [`API_BASE_URL_ENV`] is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Delay between a successful callback and the redirect to the app root.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// Route the callback redirects to on success.
pub const DEFAULT_REDIRECT_PATH: &str = "/";

/// Configuration for the client session core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend API base URL without a trailing slash
    pub api_base_url: String,

    /// How long the callback waits in the success state before redirecting
    pub redirect_delay: Duration,

    /// Route to navigate to after a successful callback
    pub redirect_path: String,

    /// Optional per-request timeout applied to auth API calls
    pub request_timeout: Option<Duration>,

    /// Buffer size of the event bus channel
    pub event_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
            request_timeout: None,
            event_buffer_size: crate::events::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Build a configuration from the host environment.
    ///
    /// Reads [`API_BASE_URL_ENV`]; an unset or blank value falls back to
    /// [`DEFAULT_API_BASE_URL`]. A set but unparsable value is an error.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(base) = api_base_url_from_env() {
            builder = builder.api_base_url(base);
        }
        builder.build()
    }

    /// Join an absolute API path onto the base URL.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid API base URL '{}': {}",
                self.api_base_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if !self.redirect_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Redirect path must be absolute, got '{}'",
                self.redirect_path
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn api_base_url_from_env() -> Option<String> {
    std::env::var(API_BASE_URL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(target_arch = "wasm32")]
fn api_base_url_from_env() -> Option<String> {
    option_env!("API_BASE_URL")
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Builder for constructing [`ClientConfig`] instances.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_base_url: Option<String>,
    redirect_delay: Option<Duration>,
    redirect_path: Option<String>,
    request_timeout: Option<Duration>,
    event_buffer_size: Option<usize>,
}

impl ClientConfigBuilder {
    /// Sets the backend API base URL. Trailing slashes are trimmed.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the delay before the post-callback redirect.
    pub fn redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = Some(delay);
        self
    }

    /// Sets the route the callback redirects to.
    pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }

    /// Sets a timeout applied to every auth API request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the event bus buffer size.
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the configuration, validating it first.
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let api_base_url = self
            .api_base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let config = ClientConfig {
            api_base_url,
            redirect_delay: self.redirect_delay.unwrap_or(defaults.redirect_delay),
            redirect_path: self.redirect_path.unwrap_or(defaults.redirect_path),
            request_timeout: self.request_timeout.or(defaults.request_timeout),
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(defaults.event_buffer_size),
        };

        config.validate()?;
        Ok(config)
    }
}
