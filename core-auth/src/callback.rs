//! # Login Callback Flow
//!
//! State machine driven by the identity provider's redirect back to the
//! portal.
//!
//! ## Overview
//!
//! The flow starts in `Processing` and ends in `Success` or `Error(message)`.
//! How the session is obtained from the callback URL is delegated to an
//! [`InputResolver`]:
//!
//! - [`CodeExchange`] - the URL carries `code`, which is exchanged with the
//!   backend for tokens and a profile
//! - [`UrlTokens`] - the backend already redirected with `access_token`,
//!   `refresh_token` and optional `email`/`name`/`picture`
//!
//! ## Transitions
//!
//! ```text
//!              ┌── error param ───────────────────────> Error(error)
//! Processing ──┼── resolver fails ────────────────────> Error(message)
//!              └── resolved ── persist ── notify ─────> Success ── delay ──> navigate("/")
//! ```
//!
//! The `error` parameter is checked before any resolution, so a denied
//! consent never reaches the network.

use async_trait::async_trait;
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::Navigator;
use core_runtime::config::ClientConfig;
use core_runtime::events::{AuthEvent, CoreEvent};
use core_runtime::logging::redact_query;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::api::AuthApi;
use crate::error::{AuthError, Result};
use crate::redirect::{schedule_redirect, RedirectHandle};
use crate::session_store::SessionStore;
use crate::types::{CallbackParams, CallbackState, TokenGrant, UserProfile};

/// Message for a code-exchange callback without `code`.
pub const MISSING_CODE_MESSAGE: &str = "No authorization code received";

/// Message for a token callback without both tokens.
pub const MISSING_TOKENS_MESSAGE: &str = "Missing authentication tokens";

/// Session data recovered from a callback.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub tokens: TokenGrant,
    pub user: Option<UserProfile>,
}

/// Strategy turning callback parameters into a session.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait InputResolver: PlatformSendSync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn resolve(&self, params: &CallbackParams) -> Result<ResolvedSession>;
}

/// Exchanges `code` with the backend.
#[derive(Debug, Clone)]
pub struct CodeExchange {
    api: AuthApi,
}

impl CodeExchange {
    pub fn new(api: AuthApi) -> Self {
        Self { api }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl InputResolver for CodeExchange {
    fn name(&self) -> &'static str {
        "code_exchange"
    }

    async fn resolve(&self, params: &CallbackParams) -> Result<ResolvedSession> {
        let code = params
            .code
            .as_deref()
            .ok_or_else(|| AuthError::MissingInput(MISSING_CODE_MESSAGE.to_string()))?;

        let exchanged = self.api.exchange_code(code).await?;
        Ok(ResolvedSession {
            tokens: exchanged.tokens,
            user: exchanged.user,
        })
    }
}

/// Reads tokens and profile fields straight from the URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlTokens;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl InputResolver for UrlTokens {
    fn name(&self) -> &'static str {
        "url_tokens"
    }

    async fn resolve(&self, params: &CallbackParams) -> Result<ResolvedSession> {
        match (&params.access_token, &params.refresh_token) {
            (Some(access), Some(refresh)) => Ok(ResolvedSession {
                tokens: TokenGrant::new(access.clone(), refresh.clone()),
                user: params.profile(),
            }),
            _ => Err(AuthError::MissingInput(MISSING_TOKENS_MESSAGE.to_string())),
        }
    }
}

/// Result of running a callback flow.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub state: CallbackState,
    /// Scheduled redirect, present only on the run that reached `Success`.
    pub redirect: Option<RedirectHandle>,
}

/// One login callback. Not resumable: create one per page load.
pub struct CallbackFlow<R: InputResolver> {
    resolver: R,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    redirect_path: String,
    state: CallbackState,
}

impl<R: InputResolver> CallbackFlow<R> {
    pub fn new(
        resolver: R,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            resolver,
            store,
            navigator,
            redirect_delay: config.redirect_delay,
            redirect_path: config.redirect_path.clone(),
            state: CallbackState::Processing,
        }
    }

    pub fn state(&self) -> &CallbackState {
        &self.state
    }

    /// Parse `url` (full URL or query string) and run the flow.
    pub async fn run_url(&mut self, url: &str) -> CallbackOutcome {
        if self.state.is_terminal() {
            return self.finished();
        }
        debug!(url = %redact_query(url), "Handling login callback");
        match CallbackParams::parse(url) {
            Ok(params) => self.run(&params).await,
            Err(e) => self.fail(e.user_message()),
        }
    }

    /// Drive the flow to a terminal state.
    ///
    /// Calling again after completion returns the terminal state without
    /// side effects.
    #[instrument(skip(self, params), fields(resolver = self.resolver.name()))]
    pub async fn run(&mut self, params: &CallbackParams) -> CallbackOutcome {
        if self.state.is_terminal() {
            debug!(state = %self.state, "Callback already finished");
            return self.finished();
        }

        if let Some(error) = &params.error {
            warn!(%error, "Identity provider returned an error");
            return self.fail(error.clone());
        }

        let resolved = match self.resolver.resolve(params).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "Failed to resolve callback input");
                return self.fail(e.user_message());
            }
        };

        if let Err(e) = self.store.establish(&resolved.tokens, resolved.user.as_ref()) {
            return self.fail(e.user_message());
        }
        self.store.notify_changed();

        self.state = CallbackState::Success;
        info!(delay_ms = self.redirect_delay.as_millis() as u64, "Login callback succeeded");

        let redirect = schedule_redirect(
            self.navigator.clone(),
            self.redirect_path.clone(),
            self.redirect_delay,
        );

        CallbackOutcome {
            state: self.state.clone(),
            redirect: Some(redirect),
        }
    }

    fn finished(&self) -> CallbackOutcome {
        CallbackOutcome {
            state: self.state.clone(),
            redirect: None,
        }
    }

    fn fail(&mut self, message: String) -> CallbackOutcome {
        let message = if message.trim().is_empty() {
            crate::error::UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            message
        };

        warn!(%message, "Login callback failed");
        let _ = self
            .store
            .event_bus()
            .emit(CoreEvent::Auth(AuthEvent::CallbackFailed {
                message: message.clone(),
            }));

        self.state = CallbackState::Error(message);
        self.finished()
    }
}

impl<R: InputResolver> std::fmt::Debug for CallbackFlow<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackFlow")
            .field("resolver", &self.resolver.name())
            .field("state", &self.state)
            .field("redirect_path", &self.redirect_path)
            .finish()
    }
}
