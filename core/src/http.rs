//! HTTP transport types for the host-does-IO split.
//!
//! # Design
//! Requests and responses are plain data. The transport core builds an
//! `HttpRequest` and parses an `HttpResponse` without touching the network;
//! a [`Transport`](crate::transport::Transport) implementation performs the
//! actual round trip in between. Keeping the two sides apart lets tests
//! inspect exactly what would go on the wire.
//!
//! All fields use owned types so values can be moved into spawned tasks and
//! recorded by test transports without lifetime concerns.

/// HTTP method for a request. The upstream API only uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute, with the query string already attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a request header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a transport after reading the full body as text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
