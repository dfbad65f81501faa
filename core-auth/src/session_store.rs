//! # Session Store
//!
//! Single source of truth for the persisted client session.
//!
//! ## Overview
//!
//! The session lives in host storage as discrete string entries:
//!
//! | Key               | Value                                  |
//! |-------------------|----------------------------------------|
//! | `access_token`    | bearer token                           |
//! | `refresh_token`   | refresh token                          |
//! | `token`           | alias of `access_token`                |
//! | `refreshToken`    | legacy refresh token, read-only        |
//! | `isAuthenticated` | `"true"` once a login has completed    |
//! | `user`            | JSON profile                           |
//!
//! Reads are synchronous so UI code can render authenticated or anonymous
//! state on first paint. Every change is announced on the [`EventBus`] as
//! `AuthEvent::StateChanged`; subscribers re-read the store.
//!
//! ## Usage
//!
//! ```ignore
//! let store = SessionStore::new(storage, event_bus);
//!
//! store.establish(&TokenGrant::new("access", "refresh"), Some(&profile))?;
//! store.notify_changed();
//!
//! assert!(store.is_session_active());
//! assert_eq!(store.get_tokens().access_token.as_deref(), Some("access"));
//! ```

use bridge_traits::SessionStorage;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::api::AuthApi;
use crate::error::{AuthError, Result};
use crate::keys;
use crate::types::{Session, SessionTokens, TokenGrant, UserProfile};

/// Reads and writes the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    event_bus: EventBus,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, event_bus: EventBus) -> Self {
        Self { storage, event_bus }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| AuthError::Storage(format!("Failed to write '{}': {}", key, e)))
    }

    /// Persist a token pair and mark the session authenticated.
    ///
    /// `token` is written under the `token` alias; it defaults to `access`.
    /// Values are not validated and previous values are overwritten.
    pub fn store_tokens(&self, access: &str, refresh: &str, token: Option<&str>) -> Result<()> {
        self.write(keys::ACCESS_TOKEN, access)?;
        self.write(keys::REFRESH_TOKEN, refresh)?;
        self.write(keys::TOKEN, token.unwrap_or(access))?;
        self.write(keys::IS_AUTHENTICATED, keys::AUTHENTICATED_FLAG)?;
        debug!("Stored session tokens");
        Ok(())
    }

    /// Persist the user profile as JSON, whatever its shape.
    pub fn store_user(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)
            .map_err(|e| AuthError::Parse(format!("Failed to serialize user profile: {}", e)))?;
        self.write(keys::USER, &json)
    }

    /// Access and refresh tokens, canonical keys first.
    pub fn get_tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token(),
            refresh_token: self.refresh_token(),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        keys::read_with_fallback(self.storage.as_ref(), keys::ACCESS_TOKEN_PRECEDENCE)
    }

    pub fn refresh_token(&self) -> Option<String> {
        keys::read_with_fallback(self.storage.as_ref(), keys::REFRESH_TOKEN_PRECEDENCE)
    }

    /// Stored user profile. Missing or malformed JSON yields `None`.
    pub fn get_user(&self) -> Option<UserProfile> {
        let raw = match self.storage.get_item(keys::USER) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Stored user profile is not valid JSON");
                None
            }
        }
    }

    /// The persisted authenticated flag. Token presence is not consulted.
    pub fn is_session_active(&self) -> bool {
        match self.storage.get_item(keys::IS_AUTHENTICATED) {
            Ok(flag) => flag.as_deref() == Some(keys::AUTHENTICATED_FLAG),
            Err(e) => {
                warn!(error = %e, "Failed to read authenticated flag");
                false
            }
        }
    }

    /// Snapshot of everything the store knows.
    pub fn current_session(&self) -> Session {
        Session {
            tokens: self.get_tokens(),
            is_authenticated: self.is_session_active(),
            user: self.get_user(),
        }
    }

    /// Write a completed login, replacing any previous session.
    ///
    /// A login without a profile removes the stored one. If any write fails
    /// the whole session is cleared before the error is returned, so storage
    /// never holds a partial login.
    ///
    /// Does not emit; the caller announces the change once.
    pub fn establish(&self, tokens: &TokenGrant, profile: Option<&UserProfile>) -> Result<()> {
        if let Err(e) = self.write_login(tokens, profile) {
            error!(error = %e, "Failed to establish session, rolling back");
            if let Err(rollback) = self.clear() {
                error!(error = %rollback, "Rollback left session keys behind");
            }
            return Err(e);
        }
        info!(has_user = profile.is_some(), "Session established");
        Ok(())
    }

    fn write_login(&self, tokens: &TokenGrant, profile: Option<&UserProfile>) -> Result<()> {
        self.store_tokens(&tokens.access_token, &tokens.refresh_token, None)?;
        match profile {
            Some(profile) => self.store_user(profile),
            None => self
                .storage
                .remove_item(keys::USER)
                .map_err(|e| AuthError::Storage(format!("Failed to remove '{}': {}", keys::USER, e))),
        }
    }

    /// Remove every session key.
    ///
    /// All keys are attempted even if one fails; the first failure is
    /// returned.
    pub fn clear(&self) -> Result<()> {
        let mut first_error = None;
        for key in keys::SESSION_KEYS {
            if let Err(e) = self.storage.remove_item(key) {
                error!(key, error = %e, "Failed to remove session key");
                first_error.get_or_insert(AuthError::Storage(format!(
                    "Failed to remove '{}': {}",
                    key, e
                )));
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Broadcast that the session changed.
    pub fn notify_changed(&self) {
        // No subscribers is fine
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::StateChanged));
    }

    /// End the session.
    ///
    /// When an access token is present the backend is asked to revoke it.
    /// Local state is cleared and one change notification is emitted whatever
    /// the outcome of that call. Failures are logged only.
    #[instrument(skip(self, api))]
    pub async fn sign_out(&self, api: &AuthApi) {
        info!("Signing out");

        if let Some(access_token) = self.access_token() {
            if let Err(e) = api.logout(&access_token).await {
                warn!(error = %e, "Logout request failed, clearing local session anyway");
            }
        } else {
            debug!("No access token stored, skipping logout request");
        }

        if let Err(e) = self.clear() {
            error!(error = %e, "Failed to fully clear session");
        }

        self.notify_changed();
        info!("Sign-out completed");
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStorage {
        entries: Mutex<HashMap<String, String>>,
        fail_removal_of: Option<&'static str>,
        fail_writes: bool,
        fail_writes_to: Option<&'static str>,
    }

    impl FakeStorage {
        fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn put(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    impl SessionStorage for FakeStorage {
        fn get_item(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.raw(key))
        }

        fn set_item(&self, key: &str, value: &str) -> BridgeResult<()> {
            if self.fail_writes || self.fail_writes_to == Some(key) {
                return Err(BridgeError::Storage("quota exceeded".to_string()));
            }
            self.put(key, value);
            Ok(())
        }

        fn remove_item(&self, key: &str) -> BridgeResult<()> {
            if self.fail_removal_of == Some(key) {
                return Err(BridgeError::Storage("locked".to_string()));
            }
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }

        fn keys(&self) -> BridgeResult<Vec<String>> {
            Ok(self.entries.lock().unwrap().keys().cloned().collect())
        }
    }

    fn store_with(storage: FakeStorage) -> (SessionStore, Arc<FakeStorage>, EventBus) {
        let storage = Arc::new(storage);
        let bus = EventBus::new(16);
        (SessionStore::new(storage.clone(), bus.clone()), storage, bus)
    }

    #[test]
    fn test_store_tokens_writes_alias_and_flag() {
        let (store, storage, _) = store_with(FakeStorage::default());
        store.store_tokens("a", "r", None).unwrap();

        assert_eq!(storage.raw(keys::ACCESS_TOKEN).as_deref(), Some("a"));
        assert_eq!(storage.raw(keys::REFRESH_TOKEN).as_deref(), Some("r"));
        assert_eq!(storage.raw(keys::TOKEN).as_deref(), Some("a"));
        assert_eq!(storage.raw(keys::IS_AUTHENTICATED).as_deref(), Some("true"));
    }

    #[test]
    fn test_store_tokens_explicit_alias() {
        let (store, storage, _) = store_with(FakeStorage::default());
        store.store_tokens("a", "r", Some("t")).unwrap();
        assert_eq!(storage.raw(keys::TOKEN).as_deref(), Some("t"));
    }

    #[test]
    fn test_canonical_and_alias_reads_agree() {
        let (store, storage, _) = store_with(FakeStorage::default());
        store.store_tokens("a", "r", None).unwrap();

        assert_eq!(store.get_tokens().access_token.as_deref(), Some("a"));

        storage.entries.lock().unwrap().remove(keys::ACCESS_TOKEN);
        assert_eq!(store.access_token().as_deref(), Some("a"));
    }

    #[test]
    fn test_legacy_only_storage_is_readable() {
        let storage = FakeStorage::default();
        storage.put(keys::TOKEN, "legacy-access");
        storage.put(keys::LEGACY_REFRESH_TOKEN, "legacy-refresh");
        let (store, _, _) = store_with(storage);

        let tokens = store.get_tokens();
        assert_eq!(tokens.access_token.as_deref(), Some("legacy-access"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("legacy-refresh"));
    }

    #[test]
    fn test_canonical_keys_win_over_legacy() {
        let storage = FakeStorage::default();
        storage.put(keys::REFRESH_TOKEN, "new");
        storage.put(keys::LEGACY_REFRESH_TOKEN, "old");
        let (store, _, _) = store_with(storage);

        assert_eq!(store.refresh_token().as_deref(), Some("new"));
    }

    #[test]
    fn test_session_flag_not_derived_from_tokens() {
        let storage = FakeStorage::default();
        storage.put(keys::ACCESS_TOKEN, "a");
        storage.put(keys::REFRESH_TOKEN, "r");
        let (store, _, _) = store_with(storage);

        assert!(!store.is_session_active());
        assert!(store.get_tokens().has_access_token());
    }

    #[test]
    fn test_session_flag_requires_exact_value() {
        let storage = FakeStorage::default();
        storage.put(keys::IS_AUTHENTICATED, "yes");
        let (store, _, _) = store_with(storage);
        assert!(!store.is_session_active());
    }

    #[test]
    fn test_user_round_trip_keeps_shape() {
        let (store, _, _) = store_with(FakeStorage::default());
        let profile: UserProfile = serde_json::from_value(json!({
            "email": "ada@example.com",
            "name": "Ada",
            "org": { "id": 7 }
        }))
        .unwrap();

        store.store_user(&profile).unwrap();
        assert_eq!(store.get_user(), Some(profile));
    }

    #[test]
    fn test_malformed_user_is_none() {
        let storage = FakeStorage::default();
        storage.put(keys::USER, "{not json");
        let (store, _, _) = store_with(storage);
        assert!(store.get_user().is_none());
    }

    #[test]
    fn test_missing_user_is_none() {
        let (store, _, _) = store_with(FakeStorage::default());
        assert!(store.get_user().is_none());
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let storage = FakeStorage::default();
        for key in keys::SESSION_KEYS {
            storage.put(key, "x");
        }
        storage.put("theme", "dark");
        let (store, storage, _) = store_with(storage);

        store.clear().unwrap();

        for key in keys::SESSION_KEYS {
            assert!(storage.raw(key).is_none(), "{} still present", key);
        }
        assert_eq!(storage.raw("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_clear_attempts_every_key_on_failure() {
        let storage = FakeStorage {
            fail_removal_of: Some(keys::REFRESH_TOKEN),
            ..Default::default()
        };
        for key in keys::SESSION_KEYS {
            storage.put(key, "x");
        }
        let (store, storage, _) = store_with(storage);

        let result = store.clear();
        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert!(storage.raw(keys::USER).is_none());
        assert!(storage.raw(keys::ACCESS_TOKEN).is_none());
        assert_eq!(storage.raw(keys::REFRESH_TOKEN).as_deref(), Some("x"));
    }

    #[test]
    fn test_write_failure_is_storage_error() {
        let (store, _, _) = store_with(FakeStorage {
            fail_writes: true,
            ..Default::default()
        });
        let result = store.store_tokens("a", "r", None);
        assert!(matches!(result, Err(AuthError::Storage(_))));
    }

    #[test]
    fn test_establish_does_not_emit() {
        let (store, _, bus) = store_with(FakeStorage::default());
        let mut rx = bus.subscribe();

        let mut profile = UserProfile::new();
        profile.insert("email", "ada@example.com");
        store
            .establish(&TokenGrant::new("a", "r"), Some(&profile))
            .unwrap();

        assert!(rx.try_recv().is_err());

        let session = store.current_session();
        assert!(session.is_authenticated);
        assert_eq!(session.tokens.refresh_token.as_deref(), Some("r"));
        assert_eq!(session.user, Some(profile));
    }

    #[test]
    fn test_establish_without_profile_drops_previous_user() {
        let storage = FakeStorage::default();
        storage.put(keys::USER, r#"{"email":"old@example.com"}"#);
        let (store, storage, _) = store_with(storage);

        store.establish(&TokenGrant::new("a", "r"), None).unwrap();

        assert!(storage.raw(keys::USER).is_none());
        assert!(store.get_user().is_none());
        assert!(store.is_session_active());
    }

    #[test]
    fn test_establish_rolls_back_on_profile_write_failure() {
        let storage = FakeStorage {
            fail_writes_to: Some(keys::USER),
            ..Default::default()
        };
        storage.put(keys::LEGACY_REFRESH_TOKEN, "old");
        let (store, storage, bus) = store_with(storage);
        let mut rx = bus.subscribe();

        let mut profile = UserProfile::new();
        profile.insert("email", "ada@example.com");
        let result = store.establish(&TokenGrant::new("a", "r"), Some(&profile));

        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert!(!store.is_session_active());
        for key in keys::SESSION_KEYS {
            assert!(storage.raw(key).is_none(), "{} still present", key);
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_notify_changed_emits_state_changed() {
        let (store, _, bus) = store_with(FakeStorage::default());
        let mut rx = bus.subscribe();

        store.notify_changed();

        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::Auth(AuthEvent::StateChanged)
        );
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let (store, _, _) = store_with(FakeStorage::default());
        store.notify_changed();
    }
}
