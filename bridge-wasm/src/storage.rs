//! `localStorage` implementation of the session storage bridge.
//!
//! Keys are written unprefixed so sessions created by earlier builds of the
//! portal (which used `localStorage` directly) remain readable.

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    SessionStorage,
};

use crate::error::{js_error, window, WasmError};

/// Session storage backed by `window.localStorage`.
#[derive(Clone)]
pub struct LocalSessionStorage {
    storage: web_sys::Storage,
}

impl LocalSessionStorage {
    /// Bind to the current window's `localStorage`.
    ///
    /// Fails when storage is disabled (private browsing modes, sandboxed
    /// iframes).
    pub fn new() -> BridgeResult<Self> {
        let storage = window()?
            .local_storage()
            .map_err(|err| js_error("localStorage", err))?
            .ok_or_else(|| BridgeError::from(WasmError::NotAvailable("localStorage".into())))?;
        Ok(Self { storage })
    }
}

impl SessionStorage for LocalSessionStorage {
    fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| js_error("get_item", err))
    }

    fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| js_error("set_item", err))
    }

    fn remove_item(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| js_error("remove_item", err))
    }

    fn keys(&self) -> BridgeResult<Vec<String>> {
        let length = self
            .storage
            .length()
            .map_err(|err| js_error("length", err))?;

        let mut keys = Vec::with_capacity(length as usize);
        for index in 0..length {
            if let Some(key) = self
                .storage
                .key(index)
                .map_err(|err| js_error("key", err))?
            {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
