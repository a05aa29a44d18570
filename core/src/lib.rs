//! Async client for the Workplace Search custom-source API.
//!
//! # Overview
//! `WorkplaceSearchClient` exposes one method per remote operation (index and
//! delete documents, read and edit per-user document permissions). Each method
//! validates its parameters against the static endpoint catalog, renders the
//! path from it one segment per placeholder,
//! and delegates to `HttpClient`, which performs one authenticated round trip
//! and parses the body.
//!
//! # Design
//! - `HttpClient` splits every call into `build_*` (plain-data request),
//!   `Transport::execute` (the only I/O), and `parse_response`, so request
//!   shapes and error classification are testable without a network.
//! - Response bodies are parsed by [`json::parse_untrusted`], which treats
//!   `__proto__`, `constructor` and `prototype` keys as parse errors.
//! - Status >= 400 is a `ClientError::Transport`; an unparseable body is a
//!   `ClientError::Deserialization`; a missing parameter is a
//!   `ClientError::Configuration` raised before any I/O.
//! - Configuration is immutable after construction, so one client can serve
//!   concurrent calls.
//!
//! ```no_run
//! use workplace_search::{Document, IndexDocumentsParams, WorkplaceSearchClient};
//!
//! # async fn run() -> workplace_search::Result<()> {
//! let client = WorkplaceSearchClient::with_base_url("token", "http://localhost:3002/api/ws/v1")?;
//! let docs = vec![Document::new("Title", "Body", "https://example.com/doc").with_id("1")];
//! let results = client.index_documents(IndexDocumentsParams::new("source-key", docs)).await?;
//! println!("{results}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod json;
pub mod query;
pub mod transport;
pub mod types;
pub mod workplace;

pub use client::HttpClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use endpoints::{Endpoint, CATALOG};
pub use error::{ClientError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{Query, QueryValue};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    DeleteDocumentsParams, Document, EndpointParams, GetUserPermissionsParams,
    IndexDocumentsParams, ListAllPermissionsParams, UserPermissionsParams,
};
pub use workplace::WorkplaceSearchClient;
