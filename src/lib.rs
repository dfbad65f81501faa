//! Model Card Portal client session core.
//!
//! Thin umbrella over the workspace crates. Enable `desktop-shims` (default)
//! for native hosts or `wasm` for the browser build; both re-export the
//! `core-service` façade.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;
