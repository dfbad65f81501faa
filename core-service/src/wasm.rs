//! WebAssembly bindings for the session core
//!
//! JavaScript-friendly wrapper around [`CoreService`] so UI fragments can
//! read the session on first paint, run the callback routes and react to
//! auth state changes.

use crate::{bootstrap_wasm, CallbackKind, CallbackState, CoreService};
use core_runtime::events::RecvError;
use core_runtime::logging::{init_logging, LogLevel, LoggingConfig};
use js_sys::Promise;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// JavaScript-accessible callback route kind
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub enum JsCallbackKind {
    CodeExchange,
    UrlTokens,
}

impl From<JsCallbackKind> for CallbackKind {
    fn from(js: JsCallbackKind) -> Self {
        match js {
            JsCallbackKind::CodeExchange => CallbackKind::CodeExchange,
            JsCallbackKind::UrlTokens => CallbackKind::UrlTokens,
        }
    }
}

/// Result of a callback run, as seen from JavaScript.
#[wasm_bindgen]
pub struct JsCallbackResult {
    success: bool,
    error: Option<String>,
}

#[wasm_bindgen]
impl JsCallbackResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Error message when the callback failed.
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

impl From<CallbackState> for JsCallbackResult {
    fn from(state: CallbackState) -> Self {
        Self {
            success: state == CallbackState::Success,
            error: state.error_message().map(str::to_string),
        }
    }
}

/// Initialize browser console logging. Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_browser_logging(debug: bool) {
    let level = if debug { LogLevel::Debug } else { LogLevel::Info };
    if let Err(e) = init_logging(LoggingConfig::default().with_level(level)) {
        warn!(error = %e, "Logging already initialized");
    }
}

/// JavaScript-accessible session core
#[wasm_bindgen]
pub struct JsSessionCore {
    inner: CoreService,
}

#[wasm_bindgen]
impl JsSessionCore {
    /// Bind to `localStorage`, `fetch` and `window.location`.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<JsSessionCore, JsValue> {
        let inner = bootstrap_wasm().map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    #[wasm_bindgen(js_name = isSessionActive)]
    pub fn is_session_active(&self) -> bool {
        self.inner.is_session_active()
    }

    #[wasm_bindgen(js_name = accessToken)]
    pub fn access_token(&self) -> Option<String> {
        self.inner.session_store().access_token()
    }

    #[wasm_bindgen(js_name = refreshToken)]
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.session_store().refresh_token()
    }

    /// Stored user profile as a JSON string, or `undefined`.
    #[wasm_bindgen(js_name = userJson)]
    pub fn user_json(&self) -> Option<String> {
        self.inner
            .session_store()
            .get_user()
            .and_then(|user| serde_json::to_string(&user).ok())
    }

    /// Run the callback for the given URL or query string.
    ///
    /// Resolves to a `JsCallbackResult`. On success the page navigates to
    /// `/` after the configured delay.
    #[wasm_bindgen(js_name = handleCallback)]
    pub fn handle_callback(&self, kind: JsCallbackKind, url: String) -> Promise {
        let core = self.inner.clone();
        future_to_promise(async move {
            let outcome = core.handle_callback(kind.into(), &url).await;
            Ok(JsValue::from(JsCallbackResult::from(outcome.state)))
        })
    }

    /// Best-effort server logout, then clear local session state.
    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out(&self) -> Promise {
        let core = self.inner.clone();
        future_to_promise(async move {
            core.sign_out().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Invoke `callback` with no arguments on every auth state change.
    #[wasm_bindgen(js_name = onAuthChange)]
    pub fn on_auth_change(&self, callback: js_sys::Function) {
        let mut changes = self.inner.auth_changes();
        wasm_bindgen_futures::spawn_local(async move {
            loop {
                match changes.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if let Err(e) = callback.call0(&JsValue::NULL) {
                            warn!(error = ?e, "Auth change listener threw");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}
