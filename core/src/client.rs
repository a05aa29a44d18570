//! Transport core: authenticated request building and safe response parsing.
//!
//! # Design
//! `HttpClient` holds an immutable `ClientConfig` and a `Transport`. Each call
//! is split into a pure `build_*` step that produces an `HttpRequest`, one
//! `Transport::execute`, and a pure `parse_response` step. Only the middle
//! step does I/O, so the first and last are tested without a network.
//!
//! Classification in `parse_response`:
//! - status >= 400 is a `Transport` error carrying status, headers and body;
//! - anything else must parse as JSON without forbidden keys, otherwise it is
//!   a `Deserialization` error carrying the parser message and raw body.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::json;
use crate::query::Query;
use crate::transport::{ReqwestTransport, Transport};

/// Low-level client bound to one base URL and access token.
#[derive(Debug, Clone)]
pub struct HttpClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl HttpClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_get(&self, path: &str, query: Option<&Query>) -> Result<HttpRequest> {
        let url = self.resolve(split_path(path), query)?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_post<P>(&self, path: &str, query: Option<&Query>, payload: &P) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let body = encode(payload)?;
        let url = self.resolve(split_path(path), query)?;
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    /// Build a request from path segments that are already split. Each
    /// segment is encoded on its own, so a `/` inside one stays inside it.
    pub fn build_request<P>(
        &self,
        method: HttpMethod,
        segments: &[String],
        query: Option<&Query>,
        payload: Option<&P>,
    ) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let body = payload.map(encode).transpose()?;
        let url = self.resolve(segments.iter().map(String::as_str), query)?;
        Ok(self.request(method, url, body))
    }

    /// Classify a response and parse its body.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        if response.status >= 400 {
            let reason = reqwest::StatusCode::from_u16(response.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown Status");
            return Err(ClientError::Transport(TransportError {
                status: Some(response.status),
                headers: response.headers,
                body: response.body,
                reason: reason.to_string(),
            }));
        }
        json::parse_untrusted(&response.body).map_err(|e| ClientError::Deserialization {
            message: e.to_string(),
            body: response.body,
        })
    }

    pub async fn get(&self, path: &str, query: Option<&Query>) -> Result<Value> {
        let request = self.build_get(path, query)?;
        self.round_trip(request).await
    }

    pub async fn post<P>(&self, path: &str, query: Option<&Query>, payload: &P) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_post(path, query, payload)?;
        self.round_trip(request).await
    }

    /// Segment-based counterpart of `get` and `post`.
    pub async fn send<P>(
        &self,
        method: HttpMethod,
        segments: &[String],
        query: Option<&Query>,
        payload: Option<&P>,
    ) -> Result<Value>
    where
        P: Serialize + ?Sized,
    {
        let request = self.build_request(method, segments, query, payload)?;
        self.round_trip(request).await
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<Value> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        self.parse_response(response)
    }

    fn request(&self, method: HttpMethod, url: Url, body: Option<String>) -> HttpRequest {
        let mut headers = self.config.default_headers();
        if let Some(body) = &body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            headers.push(("Content-Length".to_string(), body.len().to_string()));
        }
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Join `segments` onto the base URL, percent-encoding each one, then
    /// attach `query`.
    fn resolve<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        query: Option<&Query>,
    ) -> Result<Url> {
        let mut url = self.config.base_url()?;
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some(query) = query {
            query.append_to(&mut url);
        }
        Ok(url)
    }
}

/// Split a slash-separated path, dropping one leading `/`.
fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn encode<P: Serialize + ?Sized>(payload: &P) -> Result<String> {
    serde_json::to_string(payload).map_err(|e| ClientError::Serialization(e.to_string()))
}
