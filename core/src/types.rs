//! Domain DTOs and per-operation parameters.
//!
//! # Design
//! Parameter structs keep every field optional so that a caller can leave one
//! out; the facade reports that as a `Configuration` error instead of sending
//! a half-formed request. The `new` constructors take every required value
//! and are the normal way to build them.

use serde::{Deserialize, Serialize};

/// A document for a custom content source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(rename = "_allow_permissions", default, skip_serializing_if = "Option::is_none")]
    pub allow_permissions: Option<Vec<String>>,
    #[serde(rename = "_deny_permissions", default, skip_serializing_if = "Option::is_none")]
    pub deny_permissions: Option<Vec<String>>,
}

impl Document {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            body: body.into(),
            url: url.into(),
            allow_permissions: None,
            deny_permissions: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn allow(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allow_permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn deny(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.deny_permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexDocumentsParams {
    pub content_source_key: Option<String>,
    pub documents: Option<Vec<Document>>,
}

impl IndexDocumentsParams {
    pub fn new(content_source_key: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            content_source_key: Some(content_source_key.into()),
            documents: Some(documents),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteDocumentsParams {
    pub content_source_key: Option<String>,
    pub document_ids: Option<Vec<String>>,
}

impl DeleteDocumentsParams {
    pub fn new(
        content_source_key: impl Into<String>,
        document_ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            content_source_key: Some(content_source_key.into()),
            document_ids: Some(document_ids.into_iter().map(Into::into).collect()),
        }
    }
}

/// Parameters for listing every user's permissions. Paging is optional; the
/// server defaults to page 1 with 25 results.
#[derive(Debug, Clone, Default)]
pub struct ListAllPermissionsParams {
    pub content_source_key: Option<String>,
    pub current_page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListAllPermissionsParams {
    pub fn new(content_source_key: impl Into<String>) -> Self {
        Self {
            content_source_key: Some(content_source_key.into()),
            ..Self::default()
        }
    }

    pub fn current_page(mut self, page: u32) -> Self {
        self.current_page = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetUserPermissionsParams {
    pub content_source_key: Option<String>,
    pub user: Option<String>,
}

impl GetUserPermissionsParams {
    pub fn new(content_source_key: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            content_source_key: Some(content_source_key.into()),
            user: Some(user.into()),
        }
    }
}

/// Shared by the replace, add and remove permission operations.
#[derive(Debug, Clone, Default)]
pub struct UserPermissionsParams {
    pub content_source_key: Option<String>,
    pub user: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl UserPermissionsParams {
    pub fn new(
        content_source_key: impl Into<String>,
        user: impl Into<String>,
        permissions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            content_source_key: Some(content_source_key.into()),
            user: Some(user.into()),
            permissions: Some(permissions.into_iter().map(Into::into).collect()),
        }
    }
}

/// Name-based view of a parameter struct, matched against an endpoint's
/// `required` list and path template.
pub trait EndpointParams {
    /// Whether `name` holds a usable value. Empty strings count as absent.
    fn is_present(&self, name: &str) -> bool;

    /// String value of `name` for a path placeholder.
    fn path_value(&self, name: &str) -> Option<&str>;
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl EndpointParams for IndexDocumentsParams {
    fn is_present(&self, name: &str) -> bool {
        match name {
            "documents" => self.documents.is_some(),
            _ => self.path_value(name).is_some(),
        }
    }

    fn path_value(&self, name: &str) -> Option<&str> {
        match name {
            "content_source_key" => non_empty(&self.content_source_key),
            _ => None,
        }
    }
}

impl EndpointParams for DeleteDocumentsParams {
    fn is_present(&self, name: &str) -> bool {
        match name {
            "document_ids" => self.document_ids.is_some(),
            _ => self.path_value(name).is_some(),
        }
    }

    fn path_value(&self, name: &str) -> Option<&str> {
        match name {
            "content_source_key" => non_empty(&self.content_source_key),
            _ => None,
        }
    }
}

impl EndpointParams for ListAllPermissionsParams {
    fn is_present(&self, name: &str) -> bool {
        match name {
            "current_page" => self.current_page.is_some(),
            "page_size" => self.page_size.is_some(),
            _ => self.path_value(name).is_some(),
        }
    }

    fn path_value(&self, name: &str) -> Option<&str> {
        match name {
            "content_source_key" => non_empty(&self.content_source_key),
            _ => None,
        }
    }
}

impl EndpointParams for GetUserPermissionsParams {
    fn is_present(&self, name: &str) -> bool {
        self.path_value(name).is_some()
    }

    fn path_value(&self, name: &str) -> Option<&str> {
        match name {
            "content_source_key" => non_empty(&self.content_source_key),
            "user" => non_empty(&self.user),
            _ => None,
        }
    }
}

impl EndpointParams for UserPermissionsParams {
    fn is_present(&self, name: &str) -> bool {
        match name {
            "permissions" => self.permissions.is_some(),
            _ => self.path_value(name).is_some(),
        }
    }

    fn path_value(&self, name: &str) -> Option<&str> {
        match name {
            "content_source_key" => non_empty(&self.content_source_key),
            "user" => non_empty(&self.user),
            _ => None,
        }
    }
}
