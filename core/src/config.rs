//! Client configuration.
//!
//! A `ClientConfig` is built once and then only read. The access token is
//! kept out of `Debug` output so configs can be logged safely.

use std::fmt;

use url::Url;

use crate::error::{ClientError, Result};

/// Base URL used when the caller does not supply one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002/api/ws/v1";

/// Value of the `X-Swiftype-Client` header.
pub const CLIENT_NAME: &str = "elastic-workplace-search-rust";

/// Value of the `X-Swiftype-Client-Version` header.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CLIENT_NAME_HEADER: &str = "X-Swiftype-Client";
pub const CLIENT_VERSION_HEADER: &str = "X-Swiftype-Client-Version";

#[derive(Clone)]
pub struct ClientConfig {
    access_token: String,
    /// `None` until a caller overrides [`DEFAULT_BASE_URL`].
    base_url: Option<Url>,
}

impl ClientConfig {
    /// Config for `access_token` against [`DEFAULT_BASE_URL`].
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: None,
        }
    }

    /// Replace the base URL. Fails with `Configuration` when `base_url` does
    /// not parse or cannot carry a path (e.g. `mailto:`).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;
        if url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The base URL every request path is joined onto.
    pub fn base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(DEFAULT_BASE_URL)?),
        }
    }

    /// Headers attached to every request.
    pub(crate) fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), format!("Bearer {}", self.access_token)),
            (CLIENT_NAME_HEADER.to_string(), CLIENT_NAME.to_string()),
            (CLIENT_VERSION_HEADER.to_string(), CLIENT_VERSION.to_string()),
        ]
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &"<redacted>")
            .field(
                "base_url",
                &self.base_url.as_ref().map_or(DEFAULT_BASE_URL, Url::as_str),
            )
            .finish()
    }
}
