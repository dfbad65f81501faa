//! Session Storage Abstraction
//!
//! Origin-scoped string key/value storage used to persist the client session.
//!
//! The contract mirrors the browser's `localStorage`: values are plain strings,
//! every call is synchronous, and a missing key is `Ok(None)` rather than an
//! error. Implementations exist for:
//! - Web: `window.localStorage` (`bridge-wasm`)
//! - Desktop: in-memory map or JSON file (`bridge-desktop`)

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Synchronous string key/value storage.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SessionStorage;
///
/// fn remember_theme(storage: &dyn SessionStorage) -> Result<()> {
///     storage.set_item("theme", "dark")?;
///     Ok(())
/// }
/// ```
pub trait SessionStorage: PlatformSendSync {
    /// Read a value. Returns `Ok(None)` if the key has never been written
    /// or was removed.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous value for the key.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List all keys currently held by this storage.
    fn keys(&self) -> Result<Vec<String>>;

    /// Check whether a key is present.
    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key)?.is_some())
    }

    /// Remove several keys, stopping at the first failure.
    fn remove_items(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }
}
