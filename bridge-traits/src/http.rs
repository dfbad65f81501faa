//! HTTP bridge.
//!
//! The auth core issues exactly two kinds of call: a `GET` to exchange an
//! authorization code and a `POST` to revoke a token. Hosts execute each
//! request once and report the status as-is; deciding what a 4xx means is
//! left to the caller.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::platform::PlatformSendSync;

/// Request verbs used against the portal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing request, built fluently.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Overrides the host's default timeout when set.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        let value = format!("Bearer {}", token.into());
        self.header("Authorization", value)
    }

    /// Serialize `payload` as the body and mark it `application/json`.
    pub fn json<T: Serialize>(self, payload: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(payload)
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot encode request body: {}", e)))?;
        let mut request = self.header("Content-Type", "application/json");
        request.body = Some(Bytes::from(encoded));
        Ok(request)
    }

    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

/// Response as received, whatever the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| BridgeError::OperationFailed(format!("Cannot decode response body: {}", e)))
    }

    pub fn text(&self) -> Result<String> {
        std::str::from_utf8(&self.body)
            .map(str::to_owned)
            .map_err(|e| BridgeError::OperationFailed(format!("Response body is not UTF-8: {}", e)))
    }
}

/// Executes requests against the backend.
///
/// Implemented with `reqwest` on native hosts and `fetch` in the browser.
///
/// ```ignore
/// let request = HttpRequest::new(HttpMethod::Post, "https://api.example.com/api/v1/auth/logout")
///     .bearer_token(&access)
///     .json(&serde_json::json!({ "token": access }))?;
/// let response = client.execute(request).await?;
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait HttpClient: PlatformSendSync {
    /// Send `request` once.
    ///
    /// Any HTTP status is `Ok`. Errors mean no response was obtained
    /// (DNS, TLS, refused connection, timeout).
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn test_logout_request_shape() {
        let request = HttpRequest::new(HttpMethod::Post, "https://api.example.com/api/v1/auth/logout")
            .bearer_token("a1")
            .json(&serde_json::json!({ "token": "a1" }))
            .unwrap()
            .timeout(Duration::from_secs(5));

        assert_eq!(request.method.to_string(), "POST");
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer a1")
        );
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body, Some(Bytes::from_static(br#"{"token":"a1"}"#)));
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_success_range() {
        assert!(response(200, "").is_success());
        assert!(response(204, "").is_success());
        assert!(!response(302, "").is_success());
        assert!(!response(401, "").is_success());
    }

    #[test]
    fn test_rejection_body_decodes() {
        let rejected = response(400, r#"{"detail":"Invalid code"}"#);
        let body: serde_json::Value = rejected.json().unwrap();
        assert_eq!(body["detail"], "Invalid code");
        assert_eq!(rejected.text().unwrap(), r#"{"detail":"Invalid code"}"#);
    }

    #[test]
    fn test_non_json_body_is_error() {
        let html = response(502, "<html>Bad Gateway</html>");
        assert!(html.json::<serde_json::Value>().is_err());
    }
}
