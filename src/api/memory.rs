//! In-memory REST backend.
//!
//! Serves `GET/POST /<resource>` and `GET/PATCH/DELETE /<resource>/<id>` over
//! seeded JSON collections, plus custom routes for RPC-style endpoints
//! (login, payments). Failures can be scripted per request so callers can
//! exercise the error paths. Used by the demo binary and the test suites.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::decode_segment;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::types::errors::ApiError;
use crate::types::record::RecordId;

/// Handler for a custom route.
pub type Responder = Box<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>;

#[derive(Debug, Clone)]
enum Failure {
    Status(u16),
    Transport,
    Malformed,
}

#[derive(Debug, Clone)]
struct ScriptedFailure {
    method: Method,
    path_prefix: String,
    failure: Failure,
}

#[derive(Default)]
struct Backend {
    collections: HashMap<String, Vec<Value>>,
    routes: HashMap<(Method, String), Responder>,
    failures: VecDeque<ScriptedFailure>,
    log: Vec<ApiRequest>,
}

/// Transport backed by in-process collections.
#[derive(Default)]
pub struct MemoryTransport {
    backend: Mutex<Backend>,
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the contents of a collection.
    pub fn seed(&self, resource: &str, records: Vec<Value>) {
        self.lock().collections.insert(normalize(resource), records);
    }

    /// Current server-side contents of a collection.
    pub fn records(&self, resource: &str) -> Vec<Value> {
        self.lock()
            .collections
            .get(&normalize(resource))
            .cloned()
            .unwrap_or_default()
    }

    /// Registers a handler for an exact method and path.
    pub fn route<F>(&self, method: Method, path: &str, responder: F)
    where
        F: Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static,
    {
        self.lock()
            .routes
            .insert((method, normalize(path)), Box::new(responder));
    }

    /// The next matching request answers with `status` instead of being served.
    pub fn fail_next(&self, method: Method, path_prefix: &str, status: u16) {
        self.push_failure(method, path_prefix, Failure::Status(status));
    }

    /// The next matching request fails before reaching the server.
    pub fn drop_next(&self, method: Method, path_prefix: &str) {
        self.push_failure(method, path_prefix, Failure::Transport);
    }

    /// The next matching request succeeds with a body of the wrong shape.
    pub fn garble_next(&self, method: Method, path_prefix: &str) {
        self.push_failure(method, path_prefix, Failure::Malformed);
    }

    fn push_failure(&self, method: Method, path_prefix: &str, failure: Failure) {
        self.lock().failures.push_back(ScriptedFailure {
            method,
            path_prefix: normalize(path_prefix),
            failure,
        });
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().log.clone()
    }

    fn take_failure(backend: &mut Backend, request: &ApiRequest, path: &str) -> Option<Failure> {
        let idx = backend
            .failures
            .iter()
            .position(|f| f.method == request.method && path.starts_with(&f.path_prefix))?;
        backend.failures.remove(idx).map(|f| f.failure)
    }

    fn serve(backend: &mut Backend, request: &ApiRequest, path: &str) -> ApiResponse {
        if let Some(responder) = backend.routes.get(&(request.method, path.to_string())) {
            return responder(request);
        }

        if backend.collections.contains_key(path) {
            return Self::serve_collection(backend, request, path);
        }

        if let Some((resource, raw_id)) = path.rsplit_once('/') {
            if backend.collections.contains_key(resource) {
                let id = RecordId::parse(&decode_segment(raw_id));
                return Self::serve_item(backend, request, resource, &id);
            }
        }

        ApiResponse::new(404, Some(json!({ "error": format!("no route for {}", path) })))
    }

    fn serve_collection(backend: &mut Backend, request: &ApiRequest, path: &str) -> ApiResponse {
        let records = backend.collections.entry(path.to_string()).or_default();
        match request.method {
            Method::Get => ApiResponse::ok(Value::Array(records.clone())),
            Method::Post => {
                let mut record = match request.body.clone() {
                    Some(Value::Object(map)) => map,
                    _ => return ApiResponse::new(400, Some(json!({ "error": "expected a JSON object" }))),
                };
                if !record.contains_key("id") {
                    let next = records
                        .iter()
                        .filter_map(|r| r.get("id").and_then(Value::as_i64))
                        .max()
                        .unwrap_or(0)
                        + 1;
                    record.insert("id".to_string(), json!(next));
                }
                let created = Value::Object(record);
                records.push(created.clone());
                ApiResponse::new(201, Some(created))
            }
            _ => ApiResponse::new(405, Some(json!({ "error": "method not allowed" }))),
        }
    }

    fn serve_item(backend: &mut Backend, request: &ApiRequest, resource: &str, id: &RecordId) -> ApiResponse {
        let records = backend.collections.entry(resource.to_string()).or_default();
        let position = records
            .iter()
            .position(|r| r.get("id").and_then(RecordId::from_json).as_ref() == Some(id));
        let Some(idx) = position else {
            return ApiResponse::new(404, Some(json!({ "error": format!("{} not found", id) })));
        };

        match request.method {
            Method::Get => ApiResponse::ok(records[idx].clone()),
            Method::Patch => {
                if let (Some(Value::Object(target)), Some(Value::Object(changes))) =
                    (records.get_mut(idx), request.body.as_ref())
                {
                    for (k, v) in changes {
                        if k != "id" {
                            target.insert(k.clone(), v.clone());
                        }
                    }
                }
                ApiResponse::ok(records[idx].clone())
            }
            Method::Delete => {
                records.remove(idx);
                ApiResponse::new(200, None)
            }
            Method::Post | Method::Put => ApiResponse::new(405, Some(json!({ "error": "method not allowed" }))),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let path = normalize(&request.path);
        let mut backend = self.lock();
        backend.log.push(request.clone());

        match Self::take_failure(&mut backend, &request, &path) {
            Some(Failure::Transport) => {
                return Err(ApiError::Transport(format!("connection reset while sending {}", path)))
            }
            Some(Failure::Status(status)) => {
                return Ok(ApiResponse::new(status, Some(json!({ "error": "internal server error" }))))
            }
            Some(Failure::Malformed) => return Ok(ApiResponse::ok(json!("<html>oops</html>"))),
            None => {}
        }

        Ok(Self::serve(&mut backend, &request, &path))
    }
}
