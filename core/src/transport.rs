//! Executes `HttpRequest` values.
//!
//! # Design
//! The transport only moves bytes. It reports every status as data, so a 500
//! comes back as an `HttpResponse` and the client core decides what it means.
//! It fails only when no full body could be read; that failure carries the
//! status and headers when they were already known.

use std::future::Future;

use reqwest::header::HeaderMap;

use crate::error::{ClientError, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (proxy, TLS roots, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = header_pairs(response.headers());

        match response.text().await {
            Ok(body) => Ok(HttpResponse {
                status,
                headers,
                body,
            }),
            Err(err) => Err(ClientError::Transport(TransportError {
                status: Some(status),
                headers,
                body: String::new(),
                reason: err.to_string(),
            })),
        }
    }
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
