use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use url::Url;

use crate::error::{AuthError, Result};

/// Profile of the signed-in user as returned by the backend.
///
/// The shape is owned by the backend (`email`, `name`, `picture` and
/// whatever else it chooses to send), so the profile is kept as an opaque
/// JSON object and written back exactly as received.
///
/// # Examples
///
/// ```
/// use core_auth::UserProfile;
///
/// let mut profile = UserProfile::new();
/// profile.insert("email", "ada@example.com");
///
/// assert_eq!(profile.email(), Some("ada@example.com"));
/// assert_eq!(profile.name(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a field, `None` if absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn picture(&self) -> Option<&str> {
        self.get_str("picture")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Token pair issued by a completed login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Tokens read back from session storage.
///
/// Either value may be missing: storage can be partially populated by older
/// releases or cleared by another tab.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Snapshot of the persisted client session.
///
/// `is_authenticated` is the stored flag, never derived from token presence.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub tokens: SessionTokens,
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("tokens", &self.tokens)
            .field("is_authenticated", &self.is_authenticated)
            .field("has_user", &self.user.is_some())
            .finish()
    }
}

/// Query parameters delivered to the login callback route.
///
/// Empty values are treated as absent, so `?code=` behaves like a missing
/// code.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl CallbackParams {
    /// Parse either a full callback URL or a bare query string.
    ///
    /// ```
    /// use core_auth::CallbackParams;
    ///
    /// let params = CallbackParams::parse("https://portal.example/auth/callback?code=abc").unwrap();
    /// assert_eq!(params.code.as_deref(), Some("abc"));
    ///
    /// let params = CallbackParams::parse("?error=access_denied").unwrap();
    /// assert_eq!(params.error.as_deref(), Some("access_denied"));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.contains("://") {
            Self::from_url(input)
        } else {
            Ok(Self::from_query(input))
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| AuthError::Parse(format!("Invalid callback URL: {}", e)))?;
        Ok(Self::from_pairs(url.query_pairs()))
    }

    /// Parse a query string, optionally preceded by a path and `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.split_once('?').map_or(query, |(_, rest)| rest);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "error" => &mut params.error,
                "access_token" => &mut params.access_token,
                "refresh_token" => &mut params.refresh_token,
                "email" => &mut params.email,
                "name" => &mut params.name,
                "picture" => &mut params.picture,
                _ => continue,
            };
            // First occurrence wins, like URLSearchParams.get
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Profile assembled from the `email`, `name` and `picture` parameters.
    ///
    /// Only present fields are included; `None` when all three are absent.
    pub fn profile(&self) -> Option<UserProfile> {
        let mut profile = UserProfile::new();
        for (key, value) in [
            ("email", &self.email),
            ("name", &self.name),
            ("picture", &self.picture),
        ] {
            if let Some(value) = value {
                profile.insert(key, value.clone());
            }
        }
        (!profile.is_empty()).then_some(profile)
    }
}

impl fmt::Debug for CallbackParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackParams")
            .field("code", &self.code.as_ref().map(|_| "[REDACTED]"))
            .field("error", &self.error)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("has_profile", &self.profile().is_some())
            .finish()
    }
}

/// State of a login callback.
///
/// # State Transitions
///
/// ```text
/// Processing -> Success
///            \-> Error(message)
/// ```
///
/// Both outcomes are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "message")]
pub enum CallbackState {
    #[default]
    Processing,
    Success,
    Error(String),
}

impl CallbackState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallbackState::Processing)
    }

    /// Error message, if the callback failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            CallbackState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for CallbackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackState::Processing => write!(f, "Processing..."),
            CallbackState::Success => write!(f, "Success"),
            CallbackState::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_profile_round_trips_unknown_fields() {
        let raw = json!({
            "email": "ada@example.com",
            "name": "Ada",
            "picture": "https://img.example/ada.png",
            "roles": ["admin"],
            "id": 42
        });

        let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(profile.email(), Some("ada@example.com"));
        assert_eq!(profile.get("id"), Some(&json!(42)));
        assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
    }

    #[test]
    fn test_profile_get_str_ignores_non_strings() {
        let profile: UserProfile = serde_json::from_value(json!({ "name": 7 })).unwrap();
        assert_eq!(profile.name(), None);
        assert!(profile.get("name").is_some());
    }

    #[test]
    fn test_token_debug_redacts() {
        let grant = TokenGrant::new("secret-access", "secret-refresh");
        let debug_str = format!("{:?}", grant);
        assert!(!debug_str.contains("secret"));
        assert!(debug_str.contains("[REDACTED]"));

        let tokens = SessionTokens {
            access_token: Some("secret-access".to_string()),
            refresh_token: None,
        };
        let debug_str = format!("{:?}", tokens);
        assert!(!debug_str.contains("secret"));
        assert!(debug_str.contains("None"));
    }

    #[test]
    fn test_parse_full_url() {
        let params = CallbackParams::parse(
            "https://portal.example/auth/callback?access_token=a&refresh_token=r&email=ada%40example.com&name=Ada%20L",
        )
        .unwrap();

        assert_eq!(params.access_token.as_deref(), Some("a"));
        assert_eq!(params.refresh_token.as_deref(), Some("r"));
        assert_eq!(params.email.as_deref(), Some("ada@example.com"));
        assert_eq!(params.name.as_deref(), Some("Ada L"));
        assert!(params.picture.is_none());
        assert!(params.code.is_none());
    }

    #[test]
    fn test_parse_query_with_and_without_prefix() {
        let with = CallbackParams::parse("?code=abc&state=xyz").unwrap();
        let without = CallbackParams::parse("code=abc&state=xyz").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.code.as_deref(), Some("abc"));

        let with_path = CallbackParams::parse("/auth/callback?code=abc&state=xyz").unwrap();
        assert_eq!(with_path, with);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params = CallbackParams::parse("?code=&error=").unwrap();
        assert!(params.code.is_none());
        assert!(params.error.is_none());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let params = CallbackParams::from_query("code=first&code=second");
        assert_eq!(params.code.as_deref(), Some("first"));
    }

    #[test]
    fn test_invalid_url_is_parse_error() {
        let result = CallbackParams::parse("http://[::1");
        assert!(matches!(result, Err(AuthError::Parse(_))));
    }

    #[test]
    fn test_profile_from_params() {
        let params = CallbackParams::from_query("email=ada%40example.com&picture=p.png");
        let profile = params.profile().unwrap();
        assert_eq!(profile.email(), Some("ada@example.com"));
        assert_eq!(profile.picture(), Some("p.png"));
        assert!(profile.get("name").is_none());

        assert!(CallbackParams::from_query("access_token=a").profile().is_none());
    }

    #[test]
    fn test_callback_state_terminal() {
        assert!(!CallbackState::Processing.is_terminal());
        assert!(CallbackState::Success.is_terminal());

        let failed = CallbackState::Error("access_denied".to_string());
        assert!(failed.is_terminal());
        assert_eq!(failed.error_message(), Some("access_denied"));
        assert_eq!(failed.to_string(), "Error: access_denied");
    }
}
