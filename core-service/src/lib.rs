//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (session storage,
//! HTTP, navigation) into the session core. Desktop apps typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`), whereas
//! WebAssembly builds enable the `wasm` feature and rely on the adapters from
//! `bridge-wasm`.
//!
//! ```ignore
//! let (core, navigator) = bootstrap_desktop(ClientConfig::from_env()?, None)?;
//!
//! let outcome = core
//!     .handle_callback(CallbackKind::CodeExchange, "/auth/callback?code=4/0Ab")
//!     .await;
//!
//! if core.is_session_active() {
//!     core.sign_out().await;
//! }
//! ```

pub mod error;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use error::{CoreError, Result};

// Re-export the types hosts need alongside the façade
pub use core_auth::{
    CallbackOutcome, CallbackParams, CallbackState, RedirectHandle, Session, SessionTokens,
    UserProfile,
};
pub use core_runtime::config::ClientConfig;
pub use core_runtime::events::{AuthEvent, CoreEvent, EventBus, EventStream};

use std::sync::Arc;

use bridge_traits::{HttpClient, Navigator, SessionStorage};
use core_auth::{AuthApi, CallbackFlow, CodeExchange, SessionStore, UrlTokens};
use tracing::info;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use bridge_desktop::{HistoryNavigator, JsonFileStorage, MemoryStorage, ReqwestHttpClient};
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use std::path::PathBuf;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};

/// Aggregated handle to all bridge dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub storage: Arc<dyn SessionStorage>,
    pub http_client: Arc<dyn HttpClient>,
    pub navigator: Arc<dyn Navigator>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        http_client: Arc<dyn HttpClient>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            storage,
            http_client,
            navigator,
        }
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl From<WasmBridgeSet> for CoreDependencies {
    fn from(set: WasmBridgeSet) -> Self {
        Self {
            storage: set.storage,
            http_client: set.http_client,
            navigator: set.navigator,
        }
    }
}

/// Which callback route is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    /// `?code=` from the identity provider, exchanged with the backend
    CodeExchange,
    /// `?access_token=&refresh_token=` issued directly by the backend
    UrlTokens,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    config: ClientConfig,
    store: SessionStore,
    api: AuthApi,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let store = SessionStore::new(Arc::clone(&deps.storage), event_bus);
        let api = AuthApi::new(Arc::clone(&deps.http_client), &config);

        info!(api_base_url = %config.api_base_url, "Session core initialized");
        Ok(Self {
            deps: Arc::new(deps),
            config,
            store,
            api,
        })
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        self.store.event_bus()
    }

    /// Stream of auth state changes only.
    pub fn auth_changes(&self) -> EventStream {
        EventStream::new(self.event_bus().subscribe()).filter(CoreEvent::is_auth_state_change)
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    pub fn session(&self) -> Session {
        self.store.current_session()
    }

    pub fn is_session_active(&self) -> bool {
        self.store.is_session_active()
    }

    /// A fresh code-exchange callback flow.
    pub fn code_exchange_flow(&self) -> CallbackFlow<CodeExchange> {
        CallbackFlow::new(
            CodeExchange::new(self.api.clone()),
            self.store.clone(),
            Arc::clone(&self.deps.navigator),
            &self.config,
        )
    }

    /// A fresh tokens-in-URL callback flow.
    pub fn url_tokens_flow(&self) -> CallbackFlow<UrlTokens> {
        CallbackFlow::new(
            UrlTokens,
            self.store.clone(),
            Arc::clone(&self.deps.navigator),
            &self.config,
        )
    }

    /// Run one callback for `url` (full URL or query string).
    pub async fn handle_callback(&self, kind: CallbackKind, url: &str) -> CallbackOutcome {
        match kind {
            CallbackKind::CodeExchange => self.code_exchange_flow().run_url(url).await,
            CallbackKind::UrlTokens => self.url_tokens_flow().run_url(url).await,
        }
    }

    /// Best-effort logout; always clears the local session.
    pub async fn sign_out(&self) {
        self.store.sign_out(&self.api).await;
    }
}

/// Convenience bootstrapper for native hosts.
///
/// Sessions persist to `storage_path` when given, otherwise they live in
/// memory for the lifetime of the process. The returned navigator records the
/// routes the core navigates to.
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_desktop(
    config: ClientConfig,
    storage_path: Option<PathBuf>,
) -> Result<(CoreService, Arc<HistoryNavigator>)> {
    let storage: Arc<dyn SessionStorage> = match storage_path {
        Some(path) => Arc::new(JsonFileStorage::open(path)?),
        None => Arc::new(MemoryStorage::new()),
    };
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    let navigator = Arc::new(HistoryNavigator::new());

    let deps = CoreDependencies::new(storage, http_client, navigator.clone());
    Ok((CoreService::new(deps, config)?, navigator))
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// The API base URL is taken from `API_BASE_URL` at build time.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn bootstrap_wasm() -> Result<CoreService> {
    let config = ClientConfig::from_env()?;
    let bridges = build_wasm_bridges()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    CoreService::new(CoreDependencies::from(bridges), config)
}
