//! Request dispatch seam between the API client and the network.
//!
//! Client-side (csr): `fetch` via `gloo-net`, raced against a `gloo-timers`
//! timeout. Native builds have no browser transport; tests plug in their
//! own [`Transport`].

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::time::Duration;

use super::error::ApiError;

pub const AUTHORIZATION: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outgoing request, fully resolved except for authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON body, already serialized.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn post_json(url: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body: Some(body),
        }
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and waits at most `timeout` for its response.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse, ApiError>;
}

/// Pre-dispatch hook: carry `Authorization: Bearer <token>` when a token is
/// present, and no authorization header at all otherwise.
pub fn authorize(request: &mut HttpRequest, token: Option<&str>) {
    request.remove_header(AUTHORIZATION);
    if let Some(token) = token {
        request.headers.push((AUTHORIZATION.to_owned(), format!("Bearer {token}")));
    }
}

/// `fetch`-backed transport for the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse, ApiError> {
        #[cfg(feature = "csr")]
        {
            use futures::future::{Either, select};

            let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            let exchange = Box::pin(fetch(request));
            let timer = Box::pin(gloo_timers::future::TimeoutFuture::new(u32::try_from(ms).unwrap_or(u32::MAX)));
            match select(exchange, timer).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => {
                    log::warn!("request timed out after {ms}ms");
                    Err(ApiError::Timeout { ms })
                }
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (request, timeout);
            Err(ApiError::Network("browser transport unavailable outside the browser".to_owned()))
        }
    }
}

#[cfg(feature = "csr")]
async fn fetch(request: HttpRequest) -> Result<HttpResponse, ApiError> {
    let mut builder = match request.method {
        Method::Get => gloo_net::http::Request::get(&request.url),
        Method::Post => gloo_net::http::Request::post(&request.url),
    };
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    let built = match request.body {
        Some(body) => builder.body(body),
        None => builder.build(),
    }
    .map_err(|e| ApiError::Encode(e.to_string()))?;
    let resp = built.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
    let status = resp.status();
    let body = resp.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
    Ok(HttpResponse { status, body })
}
