//! Session storage keys and the legacy alias shim.
//!
//! The session is persisted as discrete string entries rather than one
//! serialized object. Older releases wrote tokens under different names, so
//! reads go through [`read_with_fallback`] with an explicit precedence list.

use bridge_traits::SessionStorage;
use tracing::warn;

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
/// Alias of [`ACCESS_TOKEN`], still written for older readers.
pub const TOKEN: &str = "token";
/// Legacy refresh token key. Read as a fallback, never written.
pub const LEGACY_REFRESH_TOKEN: &str = "refreshToken";
pub const IS_AUTHENTICATED: &str = "isAuthenticated";
pub const USER: &str = "user";

/// Value stored under [`IS_AUTHENTICATED`] for an established session.
pub const AUTHENTICATED_FLAG: &str = "true";

/// Access token lookup order.
pub const ACCESS_TOKEN_PRECEDENCE: &[&str] = &[ACCESS_TOKEN, TOKEN];

/// Refresh token lookup order.
pub const REFRESH_TOKEN_PRECEDENCE: &[&str] = &[REFRESH_TOKEN, LEGACY_REFRESH_TOKEN];

/// Every key owned by the session. Sign-out removes all of them.
pub const SESSION_KEYS: [&str; 6] = [
    ACCESS_TOKEN,
    REFRESH_TOKEN,
    TOKEN,
    LEGACY_REFRESH_TOKEN,
    IS_AUTHENTICATED,
    USER,
];

/// Return the first non-empty value among `precedence`.
///
/// A read failure on one key is logged and the next key is tried.
pub fn read_with_fallback(storage: &dyn SessionStorage, precedence: &[&str]) -> Option<String> {
    precedence.iter().find_map(|key| match storage.get_item(key) {
        Ok(Some(value)) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read session key");
            None
        }
    })
}
