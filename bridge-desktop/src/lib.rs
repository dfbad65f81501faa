//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for native hosts
//! (macOS, Windows, Linux, and test harnesses).
//!
//! ## Overview
//!
//! - `SessionStorage` using an in-memory map or a JSON file in the platform
//!   data directory
//! - `HttpClient` using `reqwest`
//! - `Navigator` recording route history for the shell to render
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HistoryNavigator, JsonFileStorage, ReqwestHttpClient};
//!
//! let storage = JsonFileStorage::open_default("modelcard-portal")?;
//! let http_client = ReqwestHttpClient::new()?;
//! let navigator = HistoryNavigator::new();
//! ```

mod http;
mod navigation;
mod storage;

pub use http::ReqwestHttpClient;
pub use navigation::HistoryNavigator;
pub use storage::{JsonFileStorage, MemoryStorage, DEFAULT_STORAGE_FILE};
