use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const API_PREFIX: &str = "/api/ws/v1";
pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const POLLUTED_BODY: &str = r#"{"__proto__":{"a":1}}"#;

/// In-memory state of one custom content source.
#[derive(Debug, Default)]
pub struct Source {
    pub documents: HashMap<String, Value>,
    pub permissions: BTreeMap<String, Vec<String>>,
}

pub type Db = Arc<RwLock<HashMap<String, Source>>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    db: Db,
}

/// Permission bodies are accepted either as a bare array or wrapped in
/// `{"permissions": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum PermissionsBody {
    List(Vec<String>),
    Wrapped { permissions: Vec<String> },
}

impl PermissionsBody {
    fn into_vec(self) -> Vec<String> {
        match self {
            PermissionsBody::List(p) | PermissionsBody::Wrapped { permissions: p } => p,
        }
    }
}

pub fn app(access_token: &str) -> Router {
    let state = AppState {
        token: Arc::from(access_token),
        db: Arc::new(RwLock::new(HashMap::new())),
    };

    let api = Router::new()
        .route("/sources/{key}/documents/bulk_create", post(bulk_create))
        .route("/sources/{key}/documents/bulk_destroy", post(bulk_destroy))
        .route("/sources/{key}/permissions", get(list_permissions))
        .route(
            "/sources/{key}/permissions/{user}",
            get(get_user_permissions).post(replace_user_permissions),
        )
        .route("/sources/{key}/permissions/{user}/add", post(add_user_permissions))
        .route("/sources/{key}/permissions/{user}/remove", post(remove_user_permissions))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, api)
        .route("/echo", get(echo_query).post(echo_body))
        .route("/hello", any(hello))
        .route("/headers", get(client_headers))
        .route("/error", any(server_error))
        .route("/pollution", any(pollution))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener, access_token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(access_token)).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.token);
    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if supplied != Some(expected.as_str()) {
        tracing::warn!(uri = %request.uri(), "rejected request with bad credentials");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": ["Unauthorized"]})),
        )
            .into_response();
    }
    next.run(request).await
}

// --- documents ---

async fn bulk_create(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(documents): Json<Vec<Value>>,
) -> Json<Vec<Value>> {
    let mut db = state.db.write().await;
    let source = db.entry(key.clone()).or_default();

    let results: Vec<Value> = documents
        .into_iter()
        .map(|mut doc| {
            let errors = document_errors(&doc);
            let id = match doc.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => Uuid::new_v4().to_string(),
            };
            if errors.is_empty() {
                if let Some(obj) = doc.as_object_mut() {
                    obj.insert("id".to_string(), Value::String(id.clone()));
                }
                source.documents.insert(id.clone(), doc);
            }
            json!({"id": id, "errors": errors})
        })
        .collect();

    tracing::info!(source = %key, count = results.len(), "indexed documents");
    Json(results)
}

fn document_errors(doc: &Value) -> Vec<String> {
    let Some(obj) = doc.as_object() else {
        return vec!["Document must be a JSON object".to_string()];
    };
    ["title", "body", "url"]
        .into_iter()
        .filter(|field| !matches!(obj.get(*field), Some(Value::String(_))))
        .map(|field| format!("Missing required field: {field}"))
        .collect()
}

async fn bulk_destroy(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(ids): Json<Vec<String>>,
) -> Json<Vec<Value>> {
    let mut db = state.db.write().await;
    let source = db.entry(key.clone()).or_default();
    let results = ids
        .into_iter()
        .map(|id| {
            let success = source.documents.remove(&id).is_some();
            json!({"id": id, "success": success})
        })
        .collect();
    tracing::info!(source = %key, "destroyed documents");
    Json(results)
}

// --- permissions ---

async fn list_permissions(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let current = page_param(&params, "page[current]", 1)?;
    let size = page_param(&params, "page[size]", DEFAULT_PAGE_SIZE)?;

    let db = state.db.read().await;
    let all: Vec<Value> = db
        .get(&key)
        .map(|source| {
            source
                .permissions
                .iter()
                .map(|(user, permissions)| json!({"user": user, "permissions": permissions}))
                .collect()
        })
        .unwrap_or_default();

    let total = all.len();
    let total_pages = total.div_ceil(size).max(1);
    let results: Vec<Value> = all.into_iter().skip((current - 1).saturating_mul(size)).take(size).collect();

    Ok(Json(json!({
        "meta": {
            "page": {
                "current": current,
                "total_pages": total_pages,
                "total_results": total,
                "size": size,
            }
        },
        "results": results,
    })))
}

fn page_param(
    params: &HashMap<String, String>,
    name: &str,
    default: usize,
) -> Result<usize, (StatusCode, Json<Value>)> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"errors": [format!("{name} must be a positive integer")]})),
            )),
        },
    }
}

async fn get_user_permissions(
    State(state): State<AppState>,
    Path((key, user)): Path<(String, String)>,
) -> Json<Value> {
    let db = state.db.read().await;
    let permissions = db
        .get(&key)
        .and_then(|source| source.permissions.get(&user).cloned())
        .unwrap_or_default();
    Json(json!({"user": user, "permissions": permissions}))
}

async fn replace_user_permissions(
    State(state): State<AppState>,
    Path((key, user)): Path<(String, String)>,
    Json(body): Json<PermissionsBody>,
) -> Json<Value> {
    edit_permissions(&state, key, user, |current| *current = dedup(body.into_vec())).await
}

async fn add_user_permissions(
    State(state): State<AppState>,
    Path((key, user)): Path<(String, String)>,
    Json(body): Json<PermissionsBody>,
) -> Json<Value> {
    edit_permissions(&state, key, user, |current| {
        for permission in body.into_vec() {
            if !current.contains(&permission) {
                current.push(permission);
            }
        }
    })
    .await
}

async fn remove_user_permissions(
    State(state): State<AppState>,
    Path((key, user)): Path<(String, String)>,
    Json(body): Json<PermissionsBody>,
) -> Json<Value> {
    let removed = body.into_vec();
    edit_permissions(&state, key, user, |current| current.retain(|p| !removed.contains(p))).await
}

async fn edit_permissions(
    state: &AppState,
    key: String,
    user: String,
    edit: impl FnOnce(&mut Vec<String>),
) -> Json<Value> {
    let mut db = state.db.write().await;
    let source = db.entry(key).or_default();
    let permissions = source.permissions.entry(user.clone()).or_default();
    edit(permissions);
    Json(json!({"user": user, "permissions": permissions}))
}

fn dedup(permissions: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(permissions.len());
    for p in permissions {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

// --- diagnostics ---

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Json<HashMap<String, String>> {
    Json(params)
}

async fn echo_body(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn hello() -> Json<Value> {
    Json(json!({"hello": "world"}))
}

async fn client_headers(headers: HeaderMap) -> Json<Value> {
    let pick = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "authorization": pick("authorization"),
        "x-swiftype-client": pick("x-swiftype-client"),
        "x-swiftype-client-version": pick("x-swiftype-client-version"),
        "content-type": pick("content-type"),
    }))
}

async fn server_error() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"hello": "world"})))
}

async fn pollution() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], POLLUTED_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_errors_lists_missing_fields() {
        let errors = document_errors(&json!({"title": "t"}));
        assert_eq!(
            errors,
            vec![
                "Missing required field: body".to_string(),
                "Missing required field: url".to_string(),
            ]
        );
    }

    #[test]
    fn document_errors_rejects_non_objects() {
        assert_eq!(document_errors(&json!("nope")).len(), 1);
    }

    #[test]
    fn complete_document_has_no_errors() {
        let doc = json!({"title": "t", "body": "b", "url": "u"});
        assert!(document_errors(&doc).is_empty());
    }

    #[test]
    fn permissions_body_accepts_both_shapes() {
        let bare: PermissionsBody = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(bare.into_vec(), vec!["a", "b"]);
        let wrapped: PermissionsBody = serde_json::from_str(r#"{"permissions":["c"]}"#).unwrap();
        assert_eq!(wrapped.into_vec(), vec!["c"]);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn page_param_defaults_and_validates() {
        let mut params = HashMap::new();
        assert_eq!(page_param(&params, "page[size]", 25).unwrap(), 25);
        params.insert("page[size]".to_string(), "3".to_string());
        assert_eq!(page_param(&params, "page[size]", 25).unwrap(), 3);
        params.insert("page[size]".to_string(), "0".to_string());
        assert!(page_param(&params, "page[size]", 25).is_err());
    }
}
