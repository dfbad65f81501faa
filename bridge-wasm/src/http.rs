//! `fetch`-backed [`HttpClient`].
//!
//! The session core only calls two endpoints (code exchange and logout), so
//! the client is deliberately small: one attempt per request, CORS mode, an
//! optional abort-on-timeout, and only `content-type` copied back from the
//! response headers.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::future::{self, Either};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, RequestMode, Response, Window};

use crate::error::{js_error, window};

const CONTENT_TYPE: &str = "content-type";

/// HTTP client for the browser main thread.
pub struct WasmHttpClient {
    window: Window,
}

impl WasmHttpClient {
    /// Bind to the current `window`.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self { window: window()? })
    }

    async fn fetch(&self, request: &Request) -> BridgeResult<Response> {
        let value = JsFuture::from(self.window.fetch_with_request(request))
            .await
            .map_err(|err| js_error("fetch", err))?;
        value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch resolved to a non-Response".into()))
    }

    async fn fetch_within(
        &self,
        request: &Request,
        controller: &AbortController,
        limit: Duration,
    ) -> BridgeResult<Response> {
        let fetch = Box::pin(self.fetch(request));
        let deadline = Box::pin(gloo_timers::future::sleep(limit));

        match future::select(fetch, deadline).await {
            Either::Left((response, _)) => response,
            Either::Right((_, pending)) => {
                controller.abort();
                // Let the aborted promise reject before returning
                let _ = pending.await;
                warn!(url = %request.url(), timeout_ms = limit.as_millis() as u64, "Request timed out");
                Err(BridgeError::OperationFailed(format!(
                    "Request to {} timed out after {} ms",
                    request.url(),
                    limit.as_millis()
                )))
            }
        }
    }
}

fn to_fetch_request(request: &HttpRequest, controller: Option<&AbortController>) -> BridgeResult<Request> {
    let headers = Headers::new().map_err(|err| js_error("new Headers", err))?;
    for (name, value) in &request.headers {
        headers
            .set(name, value)
            .map_err(|err| js_error("Headers.set", err))?;
    }

    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    init.set_mode(RequestMode::Cors);
    init.set_headers(&headers);
    if let Some(body) = &request.body {
        let bytes = js_sys::Uint8Array::from(body.as_ref());
        init.set_body(&JsValue::from(bytes));
    }
    if let Some(controller) = controller {
        init.set_signal(Some(&controller.signal()));
    }

    Request::new_with_str_and_init(&request.url, &init).map_err(|err| js_error("new Request", err))
}

async fn into_response(response: Response) -> BridgeResult<HttpResponse> {
    let buffer = response
        .array_buffer()
        .map_err(|err| js_error("Response.arrayBuffer", err))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|err| js_error("read response body", err))?;
    let body = js_sys::Uint8Array::new(&buffer).to_vec();

    let mut headers = HashMap::new();
    if let Ok(Some(content_type)) = response.headers().get(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE.to_string(), content_type);
    }

    Ok(HttpResponse {
        status: response.status(),
        headers,
        body: Bytes::from(body),
    })
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        debug!(method = request.method.as_str(), url = %request.url, "fetch");

        let response = match request.timeout {
            Some(limit) => {
                let controller =
                    AbortController::new().map_err(|err| js_error("new AbortController", err))?;
                let fetch_request = to_fetch_request(&request, Some(&controller))?;
                self.fetch_within(&fetch_request, &controller, limit).await?
            }
            None => self.fetch(&to_fetch_request(&request, None)?).await?,
        };

        into_response(response).await
    }
}
