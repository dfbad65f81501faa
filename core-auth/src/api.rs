//! # Auth API Client
//!
//! Typed wrapper over the two backend endpoints the session core calls.
//!
//! - `GET  {base}/api/v1/auth/google/callback?code=..` exchanges an
//!   authorization code for `{ access_token, refresh_token, user }`.
//! - `POST {base}/api/v1/auth/logout` revokes the access token server-side.
//!
//! Requests are executed once through the host [`HttpClient`]; nothing is
//! retried.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_runtime::config::ClientConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{AuthError, Result};
use crate::types::{TokenGrant, UserProfile};

/// Path of the Google authorization code exchange endpoint.
pub const GOOGLE_CALLBACK_PATH: &str = "/api/v1/auth/google/callback";

/// Path of the logout endpoint.
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";

/// Message used when a rejected exchange carries no usable detail.
pub const EXCHANGE_FAILED_MESSAGE: &str = "Failed to authenticate with Google";

/// Successful body of the code exchange endpoint.
#[derive(Clone, Deserialize)]
pub struct ExchangeResponse {
    #[serde(flatten)]
    pub tokens: TokenGrant,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl fmt::Debug for ExchangeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeResponse")
            .field("tokens", &self.tokens)
            .field("has_user", &self.user.is_some())
            .finish()
    }
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    token: &'a str,
}

/// Client for the backend auth endpoints.
#[derive(Clone)]
pub struct AuthApi {
    http_client: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl AuthApi {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &ClientConfig) -> Self {
        Self {
            http_client,
            config: config.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = self.config.api_url(path);
        Url::parse(&raw).map_err(|e| AuthError::Parse(format!("Invalid endpoint '{}': {}", raw, e)))
    }

    fn with_timeout(&self, request: HttpRequest) -> HttpRequest {
        match self.config.request_timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    /// Exchange an authorization code for a session.
    ///
    /// # Errors
    ///
    /// - `AuthError::Rejected` - non-2xx status; the message is the body's
    ///   `detail` or `error` string, else [`EXCHANGE_FAILED_MESSAGE`]
    /// - `AuthError::Transport` - the request could not be completed
    /// - `AuthError::Parse` - the success body is not the expected shape
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<ExchangeResponse> {
        let mut url = self.endpoint(GOOGLE_CALLBACK_PATH)?;
        url.query_pairs_mut().append_pair("code", code);

        let request = self.with_timeout(
            HttpRequest::new(HttpMethod::Get, url.as_str()).header("Accept", "application/json"),
        );

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.is_success() {
            let message = rejection_detail(&response);
            warn!(status = response.status, "Code exchange rejected");
            return Err(AuthError::Rejected {
                status: response.status,
                message,
            });
        }

        let exchanged: ExchangeResponse = response
            .json()
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        debug!(has_user = exchanged.user.is_some(), "Code exchange succeeded");
        Ok(exchanged)
    }

    /// Tell the backend to revoke `access_token`.
    ///
    /// The response status is not inspected; only a transport failure is an
    /// error.
    #[instrument(skip(self, access_token))]
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        let url = self.endpoint(LOGOUT_PATH)?;
        let request = HttpRequest::new(HttpMethod::Post, url.as_str())
            .bearer_token(access_token)
            .json(&LogoutRequest {
                token: access_token,
            })
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let response = self
            .http_client
            .execute(self.with_timeout(request))
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        debug!(status = response.status, "Logout request completed");
        Ok(())
    }
}

impl fmt::Debug for AuthApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthApi")
            .field("base_url", &self.config.api_base_url)
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

/// Pull a human-readable reason out of an error body.
fn rejection_detail(response: &HttpResponse) -> String {
    let body: Option<Value> = response.json().ok();
    body.as_ref()
        .and_then(|body| {
            ["detail", "error"]
                .iter()
                .find_map(|field| {
                    body.get(*field)
                        .and_then(Value::as_str)
                        .filter(|detail| !detail.is_empty())
                })
        })
        .map(str::to_string)
        .unwrap_or_else(|| EXCHANGE_FAILED_MESSAGE.to_string())
}
