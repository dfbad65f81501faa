//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the session core and the host it
//! runs in. Each trait is a capability the core needs but that is implemented
//! differently in the browser and on desktop.
//!
//! ## Traits
//!
//! - [`SessionStorage`](storage::SessionStorage) - Origin-scoped string storage (`localStorage`)
//! - [`HttpClient`](http::HttpClient) - Async HTTP requests
//! - [`Navigator`](navigation::Navigator) - Route changes
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ |
//! | Web      | `bridge-wasm`       | ✅ |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it with enough context to act on
//! (storage key, URL, JavaScript exception message).
//!
//! ## Thread Safety
//!
//! On native targets every trait requires `Send + Sync`. On `wasm32` the bound
//! is dropped through [`PlatformSendSync`](platform::PlatformSendSync).

pub mod error;
pub mod http;
pub mod navigation;
pub mod platform;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use navigation::Navigator;
pub use storage::SessionStorage;
