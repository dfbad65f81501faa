//! `reqwest` implementation of [`HttpClient`] for native hosts.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("modelcard-client/", env!("CARGO_PKG_VERSION"));

/// Client-wide timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pooled rustls client. One attempt per request; statuses are passed through.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Client whose requests give up after `timeout` unless they set their own.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map(Self::with_client)
            .map_err(|e| BridgeError::NotAvailable(format!("HTTP client unavailable: {}", e)))
    }

    /// Wrap a preconfigured `reqwest::Client`.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn prepare(&self, request: HttpRequest) -> RequestBuilder {
        let builder = self.client.request(method(request.method), &request.url);
        let builder = request
            .headers
            .into_iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };
        match request.timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> BridgeError {
    let reason = if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };
    BridgeError::OperationFailed(format!("Request to {} {}", url, reason))
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        debug!(method = %request.method, %url, "Sending request");

        let response = self.prepare(request).send().await.map_err(|e| {
            warn!(%url, error = %e, "Request failed");
            transport_error(&url, e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_owned(), value.to_str().ok()?.to_owned())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, e))?;

        debug!(status, len = body.len(), "Response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method as http_method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_method_mapping() {
        assert_eq!(method(HttpMethod::Get), Method::GET);
        assert_eq!(method(HttpMethod::Post), Method::POST);
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(http_method("POST"))
            .and(path("/api/v1/auth/logout"))
            .and(header("authorization", "Bearer a"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "token": "a" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let request = HttpRequest::new(HttpMethod::Post, format!("{}/api/v1/auth/logout", server.uri()))
            .bearer_token("a")
            .json(&serde_json::json!({ "token": "a" }))
            .unwrap();

        let response = client.execute(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_get_keeps_query_string() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(path("/api/v1/auth/google/callback"))
            .and(query_param("code", "4/0Ab"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let url = format!("{}/api/v1/auth/google/callback?code=4%2F0Ab", server.uri());
        let response = client
            .execute(HttpRequest::new(HttpMethod::Get, url))
            .await
            .unwrap();

        assert_eq!(response.text().unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "detail": "Invalid code xyz" })),
            )
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let response = client
            .execute(HttpRequest::new(HttpMethod::Get, server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert!(!response.is_success());
        assert!(response.text().unwrap().contains("Invalid code"));
    }

    #[tokio::test]
    async fn test_request_timeout_is_error() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let request =
            HttpRequest::new(HttpMethod::Get, server.uri()).timeout(Duration::from_millis(100));

        match client.execute(request).await {
            Err(BridgeError::OperationFailed(message)) => {
                assert!(message.contains("timed out"), "{}", message)
            }
            other => panic!("expected timeout, got {:?}", other.map(|r| r.status)),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        // Reserve a port, then release it so nothing is listening.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .unwrap();

        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(2)).unwrap();
        let result = client
            .execute(HttpRequest::new(HttpMethod::Get, format!("http://{}", addr)))
            .await;

        match result {
            Err(BridgeError::OperationFailed(message)) => {
                assert!(message.contains(&addr.to_string()), "{}", message)
            }
            other => panic!("expected transport error, got {:?}", other.map(|r| r.status)),
        }
    }
}
