//! # Logging
//!
//! `tracing` setup for every host the session core runs in.
//!
//! Native hosts get a `tracing-subscriber` fmt layer (pretty, JSON or
//! compact) behind an `EnvFilter`. In the browser, events go to the devtools
//! console via `tracing-wasm`.
//!
//! Tokens, authorization codes and email addresses must never reach a log
//! line; [`redact_if_sensitive`] and [`redact_query`] exist for call sites
//! that log user-supplied values.
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_level(LogLevel::Debug),
//! )?;
//! ```

use crate::error::{Error, Result};

use tracing_subscriber::layer::SubscriberExt;
use url::form_urlencoded;
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{filter::EnvFilter, registry::Registry, util::SubscriberInitExt, Layer};

const REDACTED: &str = "[REDACTED]";

/// Field-name fragments whose values are always hidden.
const SENSITIVE_FIELDS: &[&str] = &[
    "token",
    "code",
    "password",
    "secret",
    "authorization",
    "bearer",
];

/// Output style of the native fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colored; for local development
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line text
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Minimum severity for the workspace crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Full `EnvFilter` directive; replaces the level-derived default.
    pub filter: Option<String>,
    pub show_target: bool,
    pub show_threads: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            show_target: true,
            show_threads: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// e.g. `"core_auth=trace,bridge_desktop=debug"`
    pub fn with_filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    pub fn with_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn with_thread_info(mut self, show: bool) -> Self {
        self.show_threads = show;
        self
    }
}

/// Install the global subscriber.
///
/// Only the first call in a process succeeds.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    let base = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(config.show_target)
        .with_thread_ids(config.show_threads)
        .with_thread_names(config.show_threads);
    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().flatten_event(true).boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .map_err(|e| Error::Logging(format!("Failed to initialize logging: {}", e)))
}

/// Install the browser console subscriber.
///
/// Only `level` applies; there is no format or directive filtering.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let console = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(config.level.to_tracing())
            .build(),
    );
    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(console))
        .map_err(|e| Error::Logging(format!("Failed to initialize logging: {}", e)))
}

#[cfg(not(target_arch = "wasm32"))]
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = config.filter.clone().unwrap_or_else(|| {
        let level = config.level.as_str();
        let ours = ["core_runtime", "core_auth", "core_service", "bridge_desktop"]
            .iter()
            .map(|krate| format!("{krate}={level}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("{level},{ours},h2=warn,hyper=warn,reqwest=warn,rustls=warn")
    });

    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", directives, e)))
}

fn is_sensitive(field: &str) -> bool {
    let field = field.to_ascii_lowercase();
    SENSITIVE_FIELDS.iter().any(|fragment| field.contains(fragment))
}

/// Value safe to log under `field`.
///
/// Sensitive fields are replaced outright; email-like values keep only their
/// first character.
///
/// ```
/// use core_runtime::logging::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("access_token", "ya29.abc"), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("path", "/cards"), "/cards");
/// ```
pub fn redact_if_sensitive(field: &str, value: &str) -> String {
    if is_sensitive(field) {
        return REDACTED.to_string();
    }
    match value.split_once('@') {
        Some((local, domain)) if domain.contains('.') => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{REDACTED}")
        }
        _ => value.to_string(),
    }
}

/// Callback URL with sensitive query values masked.
///
/// Keys are percent-decoded before matching, so `c%6Fde=...` is masked like
/// `code=...`. Kept pairs are re-encoded; masks are written literally.
///
/// ```
/// use core_runtime::logging::redact_query;
///
/// assert_eq!(
///     redact_query("/auth/callback?code=4/0Ab&state=x"),
///     "/auth/callback?code=[REDACTED]&state=x"
/// );
/// ```
pub fn redact_query(url: &str) -> String {
    let Some((path, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let masked = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| {
            let shown = if is_sensitive(&key) {
                REDACTED.to_string()
            } else if key.eq_ignore_ascii_case("email") {
                redact_if_sensitive(&key, &value)
            } else {
                encode(&value)
            };
            format!("{}={}", encode(&key), shown)
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{masked}")
}

fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}
