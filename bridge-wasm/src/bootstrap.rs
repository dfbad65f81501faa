//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct the storage, HTTP
//! and navigation adapters in one call. The result mirrors the role that the
//! `bridge-desktop` crate plays for native targets, giving wasm builds a single
//! entry point for assembling bridge trait objects.

use std::sync::Arc;

use bridge_traits::{error::Result as BridgeResult, HttpClient, Navigator, SessionStorage};

use crate::{http::WasmHttpClient, navigation::WindowNavigator, storage::LocalSessionStorage};

/// Fully constructed wasm bridge objects ready for injection into the core.
#[derive(Clone)]
pub struct WasmBridgeSet {
    /// Session storage on `localStorage`.
    pub storage: Arc<dyn SessionStorage>,
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// Navigation through `window.location`.
    pub navigator: Arc<dyn Navigator>,
}

impl WasmBridgeSet {
    /// Convenience accessor to clone the storage bridge.
    pub fn storage(&self) -> Arc<dyn SessionStorage> {
        Arc::clone(&self.storage)
    }

    /// Convenience accessor to clone the HTTP client.
    pub fn http(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.http_client)
    }

    /// Convenience accessor to clone the navigator.
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        Arc::clone(&self.navigator)
    }
}

/// Build the default wasm bridge stack.
///
/// Hosts should call this during startup (e.g., inside their wasm bindgen
/// bootstrap) and pass the returned trait objects into `core-service`.
pub fn build_wasm_bridges() -> BridgeResult<WasmBridgeSet> {
    console_error_panic_hook::set_once();

    #[allow(clippy::arc_with_non_send_sync)]
    let set = WasmBridgeSet {
        storage: Arc::new(LocalSessionStorage::new()?),
        http_client: Arc::new(WasmHttpClient::new()?),
        navigator: Arc::new(WindowNavigator::new()?),
    };
    Ok(set)
}
