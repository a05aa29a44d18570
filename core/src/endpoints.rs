//! Static catalog of the upstream API's custom-source endpoints.
//!
//! Path templates use `{name}` placeholders, each filling a whole segment.
//! `required` lists every parameter an operation needs, in the order the
//! facade checks them, and `method` is the verb the facade sends.

use crate::error::{ClientError, Result};
use crate::http::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub required: &'static [&'static str],
}

pub const INDEX_DOCUMENTS: Endpoint = Endpoint {
    name: "indexDocuments",
    method: HttpMethod::Post,
    path: "sources/{content_source_key}/documents/bulk_create",
    required: &["content_source_key", "documents"],
};

pub const DELETE_DOCUMENTS: Endpoint = Endpoint {
    name: "deleteDocuments",
    method: HttpMethod::Post,
    path: "sources/{content_source_key}/documents/bulk_destroy",
    required: &["content_source_key", "document_ids"],
};

pub const LIST_ALL_PERMISSIONS: Endpoint = Endpoint {
    name: "listAllPermissions",
    method: HttpMethod::Get,
    path: "sources/{content_source_key}/permissions",
    required: &["content_source_key"],
};

pub const GET_USER_PERMISSIONS: Endpoint = Endpoint {
    name: "getUserPermissions",
    method: HttpMethod::Get,
    path: "sources/{content_source_key}/permissions/{user}",
    required: &["content_source_key", "user"],
};

pub const UPDATE_USER_PERMISSIONS: Endpoint = Endpoint {
    name: "updateUserPermissions",
    method: HttpMethod::Post,
    path: "sources/{content_source_key}/permissions/{user}",
    required: &["content_source_key", "user", "permissions"],
};

pub const ADD_USER_PERMISSIONS: Endpoint = Endpoint {
    name: "addUserPermissions",
    method: HttpMethod::Post,
    path: "sources/{content_source_key}/permissions/{user}/add",
    required: &["content_source_key", "user", "permissions"],
};

pub const REMOVE_USER_PERMISSIONS: Endpoint = Endpoint {
    name: "removeUserPermissions",
    method: HttpMethod::Post,
    path: "sources/{content_source_key}/permissions/{user}/remove",
    required: &["content_source_key", "user", "permissions"],
};

pub const CATALOG: [Endpoint; 7] = [
    INDEX_DOCUMENTS,
    DELETE_DOCUMENTS,
    LIST_ALL_PERMISSIONS,
    GET_USER_PERMISSIONS,
    UPDATE_USER_PERMISSIONS,
    ADD_USER_PERMISSIONS,
    REMOVE_USER_PERMISSIONS,
];

impl Endpoint {
    /// Fail with the first name in `required` for which `is_present` is
    /// false.
    pub fn check_required(&self, is_present: impl Fn(&str) -> bool) -> Result<()> {
        match self.required.iter().find(|name| !is_present(name)) {
            Some(name) => Err(ClientError::missing_parameter(name)),
            None => Ok(()),
        }
    }

    /// Render the path template as a list of segments, one per `/`-separated
    /// part, with each `{name}` placeholder replaced by `lookup(name)`.
    ///
    /// A substituted value always stays a single segment: the transport
    /// percent-encodes any `/` it contains. Values that are empty, `.` or
    /// `..` are rejected since they would change which endpoint is hit.
    pub fn render<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> Result<Vec<String>> {
        self.path
            .split('/')
            .map(|segment| {
                let Some(name) = placeholder(segment) else {
                    return Ok(segment.to_string());
                };
                match lookup(name) {
                    None | Some("") => Err(ClientError::missing_parameter(name)),
                    Some(value @ ("." | "..")) => Err(ClientError::Configuration(format!(
                        "parameter \"{name}\" cannot be the path segment \"{value}\""
                    ))),
                    Some(value) => Ok(value.to_string()),
                }
            })
            .collect()
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{').and_then(|s| s.strip_suffix('}'))
}
