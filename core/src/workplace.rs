//! Endpoint facade: one async method per custom-source operation.
//!
//! # Design
//! Every method goes through `call`, which reads the operation's entry in the
//! static endpoint table. The entry's `required` list is checked in order and
//! the first missing or empty parameter is a `Configuration` error raised
//! before any request is built. The path is rendered from the entry's template
//! one segment per placeholder, and the entry's `method` picks the verb. The
//! parsed body is returned as the upstream sent it.

use serde::Serialize;
use serde_json::Value;

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::endpoints::{
    Endpoint, ADD_USER_PERMISSIONS, DELETE_DOCUMENTS, GET_USER_PERMISSIONS, INDEX_DOCUMENTS,
    LIST_ALL_PERMISSIONS, REMOVE_USER_PERMISSIONS, UPDATE_USER_PERMISSIONS,
};
use crate::error::Result;
use crate::query::Query;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    DeleteDocumentsParams, EndpointParams, GetUserPermissionsParams, IndexDocumentsParams,
    ListAllPermissionsParams, UserPermissionsParams,
};

const NO_BODY: Option<&()> = None;

/// Client for the Workplace Search custom-source API.
#[derive(Debug, Clone)]
pub struct WorkplaceSearchClient<T = ReqwestTransport> {
    http: HttpClient<T>,
}

impl WorkplaceSearchClient<ReqwestTransport> {
    /// Client against the default local development endpoint.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(access_token), ReqwestTransport::new())
    }

    pub fn with_base_url(access_token: impl Into<String>, base_url: &str) -> Result<Self> {
        let config = ClientConfig::new(access_token).with_base_url(base_url)?;
        Ok(Self::from_config(config, ReqwestTransport::new()))
    }
}

impl<T: Transport> WorkplaceSearchClient<T> {
    pub fn from_config(config: ClientConfig, transport: T) -> Self {
        Self {
            http: HttpClient::with_transport(config, transport),
        }
    }

    /// The underlying transport core, for calls outside the catalog.
    pub fn http(&self) -> &HttpClient<T> {
        &self.http
    }

    /// Index one or more documents into a custom content source.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn index_documents(&self, params: IndexDocumentsParams) -> Result<Value> {
        self.call(&INDEX_DOCUMENTS, &params, None, params.documents.as_deref())
            .await
    }

    /// Delete documents from a custom content source by id.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn delete_documents(&self, params: DeleteDocumentsParams) -> Result<Value> {
        self.call(&DELETE_DOCUMENTS, &params, None, params.document_ids.as_deref())
            .await
    }

    /// List permissions for every user, one page at a time.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn list_all_permissions(&self, params: ListAllPermissionsParams) -> Result<Value> {
        let mut page = Query::new();
        if let Some(current) = params.current_page {
            page.insert("current", current);
        }
        if let Some(size) = params.page_size {
            page.insert("size", size);
        }
        let query = Query::new().with("page", page);
        self.call(&LIST_ALL_PERMISSIONS, &params, Some(&query), NO_BODY)
            .await
    }

    /// List permissions for one user.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn get_user_permissions(&self, params: GetUserPermissionsParams) -> Result<Value> {
        self.call(&GET_USER_PERMISSIONS, &params, None, NO_BODY).await
    }

    /// Replace all of a user's permissions.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn update_user_permissions(&self, params: UserPermissionsParams) -> Result<Value> {
        self.call(&UPDATE_USER_PERMISSIONS, &params, None, params.permissions.as_deref())
            .await
    }

    /// Add permissions on top of a user's existing set.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn add_user_permissions(&self, params: UserPermissionsParams) -> Result<Value> {
        self.call(&ADD_USER_PERMISSIONS, &params, None, params.permissions.as_deref())
            .await
    }

    /// Remove permissions from a user's existing set.
    #[tracing::instrument(skip_all, fields(content_source_key = ?params.content_source_key))]
    pub async fn remove_user_permissions(&self, params: UserPermissionsParams) -> Result<Value> {
        self.call(&REMOVE_USER_PERMISSIONS, &params, None, params.permissions.as_deref())
            .await
    }

    async fn call<P, B>(
        &self,
        endpoint: &Endpoint,
        params: &P,
        query: Option<&Query>,
        body: Option<&B>,
    ) -> Result<Value>
    where
        P: EndpointParams,
        B: Serialize + ?Sized,
    {
        endpoint.check_required(|name| params.is_present(name))?;
        let segments = endpoint.render(|name| params.path_value(name))?;
        self.http.send(endpoint.method, &segments, query, body).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::endpoints::CATALOG;
    use crate::error::ClientError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::types::Document;
    use serde_json::json;

    /// Counts calls and records requests; answers with a fixed body.
    #[derive(Default)]
    struct RecordingTransport {
        calls: AtomicUsize,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl Transport for RecordingTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: r#"{"ok":true}"#.to_string(),
            })
        }
    }

    fn client() -> WorkplaceSearchClient<RecordingTransport> {
        let config = ClientConfig::new("mockAccessToken")
            .with_base_url("https://api.swiftype.com/api/ws/v1")
            .unwrap();
        WorkplaceSearchClient::from_config(config, RecordingTransport::default())
    }

    impl WorkplaceSearchClient<RecordingTransport> {
        fn calls(&self) -> usize {
            self.http.transport().calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> HttpRequest {
            let requests = self.http.transport().requests.lock().unwrap();
            requests.last().cloned().unwrap()
        }
    }

    fn assert_missing(err: ClientError, name: &str) {
        match err {
            ClientError::Configuration(msg) => {
                assert_eq!(msg, format!("missing required parameter \"{name}\""))
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn index_documents_without_key_makes_no_request() {
        let c = client();
        let params = IndexDocumentsParams {
            content_source_key: None,
            documents: Some(vec![Document::new("t", "b", "u")]),
        };
        let err = c.index_documents(params).await.unwrap_err();
        assert_missing(err, "content_source_key");
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn index_documents_without_documents_makes_no_request() {
        let c = client();
        let params = IndexDocumentsParams {
            content_source_key: Some("key".to_string()),
            documents: None,
        };
        assert_missing(c.index_documents(params).await.unwrap_err(), "documents");
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn empty_key_counts_as_missing() {
        let c = client();
        let err = c
            .get_user_permissions(GetUserPermissionsParams::new("", "jane"))
            .await
            .unwrap_err();
        assert_missing(err, "content_source_key");
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn first_missing_parameter_is_reported() {
        let c = client();
        let err = c
            .update_user_permissions(UserPermissionsParams::default())
            .await
            .unwrap_err();
        assert_missing(err, "content_source_key");

        let params = UserPermissionsParams {
            content_source_key: Some("key".to_string()),
            ..Default::default()
        };
        assert_missing(c.add_user_permissions(params).await.unwrap_err(), "user");

        let params = UserPermissionsParams {
            content_source_key: Some("key".to_string()),
            user: Some("jane".to_string()),
            permissions: None,
        };
        assert_missing(c.remove_user_permissions(params).await.unwrap_err(), "permissions");
        assert_eq!(c.calls(), 0);
    }

    #[tokio::test]
    async fn index_documents_posts_document_array() {
        let c = client();
        let docs = vec![Document::new("5 Tips", "Mentoring", "https://example.com/tips").with_id("1234")];
        let value = c.index_documents(IndexDocumentsParams::new("key", docs)).await.unwrap();
        assert_eq!(value, json!({"ok": true}));

        let req = c.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "https://api.swiftype.com/api/ws/v1/sources/key/documents/bulk_create"
        );
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!([{"id": "1234", "title": "5 Tips", "body": "Mentoring", "url": "https://example.com/tips"}])
        );
    }

    #[tokio::test]
    async fn delete_documents_posts_id_array() {
        let c = client();
        c.delete_documents(DeleteDocumentsParams::new("key", ["1234", "1235"]))
            .await
            .unwrap();
        let req = c.last_request();
        assert!(req.url.ends_with("/sources/key/documents/bulk_destroy"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!(["1234", "1235"]));
    }

    #[tokio::test]
    async fn list_all_permissions_without_paging_sends_no_query() {
        let c = client();
        c.list_all_permissions(ListAllPermissionsParams::new("key")).await.unwrap();
        let req = c.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.swiftype.com/api/ws/v1/sources/key/permissions");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn list_all_permissions_encodes_paging() {
        let c = client();
        c.list_all_permissions(ListAllPermissionsParams::new("key").page_size(1).current_page(2))
            .await
            .unwrap();
        let req = c.last_request();
        assert_eq!(
            req.url,
            "https://api.swiftype.com/api/ws/v1/sources/key/permissions?page%5Bcurrent%5D=2&page%5Bsize%5D=1"
        );
    }

    #[tokio::test]
    async fn permission_operations_hit_distinct_paths() {
        let c = client();
        let params = || UserPermissionsParams::new("key", "enterprise_search", ["permission1"]);

        c.update_user_permissions(params()).await.unwrap();
        assert!(c.last_request().url.ends_with("/sources/key/permissions/enterprise_search"));

        c.add_user_permissions(params()).await.unwrap();
        assert!(c.last_request().url.ends_with("/permissions/enterprise_search/add"));

        c.remove_user_permissions(params()).await.unwrap();
        let req = c.last_request();
        assert!(req.url.ends_with("/permissions/enterprise_search/remove"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!(["permission1"]));
        assert_eq!(c.calls(), 3);
    }

    #[test]
    fn http_exposes_config_without_leaking_token_in_debug() {
        let c = client();
        assert_eq!(c.http().config().access_token(), "mockAccessToken");
        assert!(!format!("{:?}", c.http().config()).contains("mockAccessToken"));
    }

    #[tokio::test]
    async fn get_user_permissions_is_a_get() {
        let c = client();
        c.get_user_permissions(GetUserPermissionsParams::new("key", "enterprise_search"))
            .await
            .unwrap();
        let req = c.last_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.url.ends_with("/sources/key/permissions/enterprise_search"));
        assert_eq!(req.header("authorization"), Some("Bearer mockAccessToken"));
    }

    /// Run the catalog operation `name` with only the parameters in `present`
    /// filled in.
    async fn invoke(
        c: &WorkplaceSearchClient<RecordingTransport>,
        name: &str,
        present: &[&str],
    ) -> Result<Value> {
        let has = |field: &str| present.iter().any(|p| *p == field);
        let set = |field: &str, value: &str| has(field).then(|| value.to_string());
        let key = set("content_source_key", "key");
        let user = set("user", "jane");
        let permissions = has("permissions").then(|| vec!["p".to_string()]);
        match name {
            "indexDocuments" => {
                c.index_documents(IndexDocumentsParams {
                    content_source_key: key,
                    documents: has("documents").then(|| vec![Document::new("t", "b", "u")]),
                })
                .await
            }
            "deleteDocuments" => {
                c.delete_documents(DeleteDocumentsParams {
                    content_source_key: key,
                    document_ids: has("document_ids").then(|| vec!["1".to_string()]),
                })
                .await
            }
            "listAllPermissions" => {
                c.list_all_permissions(ListAllPermissionsParams {
                    content_source_key: key,
                    ..Default::default()
                })
                .await
            }
            "getUserPermissions" => {
                c.get_user_permissions(GetUserPermissionsParams {
                    content_source_key: key,
                    user,
                })
                .await
            }
            other => {
                let params = UserPermissionsParams {
                    content_source_key: key,
                    user,
                    permissions,
                };
                match other {
                    "updateUserPermissions" => c.update_user_permissions(params).await,
                    "addUserPermissions" => c.add_user_permissions(params).await,
                    "removeUserPermissions" => c.remove_user_permissions(params).await,
                    unknown => panic!("no facade method for {unknown}"),
                }
            }
        }
    }

    #[tokio::test]
    async fn every_operation_validates_in_table_order() {
        for endpoint in CATALOG {
            let c = client();
            for (i, expected) in endpoint.required.iter().enumerate() {
                let err = invoke(&c, endpoint.name, &endpoint.required[..i])
                    .await
                    .unwrap_err();
                assert_missing(err, expected);
            }
            assert_eq!(c.calls(), 0, "{}", endpoint.name);

            invoke(&c, endpoint.name, endpoint.required).await.unwrap();
            assert_eq!(c.last_request().method, endpoint.method, "{}", endpoint.name);
        }
    }

    #[tokio::test]
    async fn slash_in_user_stays_one_segment() {
        let c = client();
        c.update_user_permissions(UserPermissionsParams::new("key", "bob/remove", ["p"]))
            .await
            .unwrap();
        let req = c.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "https://api.swiftype.com/api/ws/v1/sources/key/permissions/bob%2Fremove"
        );

        c.get_user_permissions(GetUserPermissionsParams::new("key", "../../../other/permissions/x"))
            .await
            .unwrap();
        assert_eq!(
            c.last_request().url,
            "https://api.swiftype.com/api/ws/v1/sources/key/permissions/..%2F..%2F..%2Fother%2Fpermissions%2Fx"
        );
    }

    #[tokio::test]
    async fn dot_segments_are_rejected_before_sending() {
        let c = client();
        for user in [".", ".."] {
            let err = c
                .get_user_permissions(GetUserPermissionsParams::new("key", user))
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Configuration(_)), "{user}: {err:?}");
        }
        let err = c
            .list_all_permissions(ListAllPermissionsParams::new(".."))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert_eq!(c.calls(), 0);
    }
}
