//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// A browser global (window, localStorage) is missing
    #[error("Browser API not available: {0}")]
    NotAvailable(String),

    /// JavaScript error from web-sys
    #[error("JavaScript error in {context}: {message}")]
    JavaScript {
        /// Operation that failed
        context: String,
        /// Exception message
        message: String,
    },
}

impl WasmError {
    /// Wrap a thrown JavaScript value with the operation it came from.
    pub fn js(context: &str, err: JsValue) -> Self {
        WasmError::JavaScript {
            context: context.to_string(),
            message: js_message(&err),
        }
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(what) => BridgeError::NotAvailable(what),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

/// Best-effort message extraction from a thrown JavaScript value.
pub(crate) fn js_message(err: &JsValue) -> String {
    if let Some(message) = err.as_string() {
        message
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    }
}

/// Shorthand for mapping a thrown value straight to a `BridgeError`.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    WasmError::js(context, err).into()
}

/// The current `window`, or `NotAvailable` outside a browsing context.
pub(crate) fn window() -> Result<web_sys::Window, BridgeError> {
    web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".to_string()).into())
}
