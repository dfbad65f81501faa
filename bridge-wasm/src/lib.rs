//! WebAssembly Bridge Implementations
//!
//! This crate provides WebAssembly-compatible implementations of the bridge traits
//! defined in `bridge-traits`. These implementations use browser APIs through
//! `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! On native targets it compiles to an empty crate.
//!
//! # Implementations
//!
//! - `LocalSessionStorage`: session storage on `window.localStorage`
//! - `WasmHttpClient`: `fetch` with `AbortController` timeouts
//! - `WindowNavigator`: route changes through `window.location`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::build_wasm_bridges;
//!
//! let bridges = build_wasm_bridges()?;
//! let storage = bridges.storage();
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeSet};
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use navigation::WindowNavigator;
pub use storage::LocalSessionStorage;
