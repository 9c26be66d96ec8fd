//! Typed access to one REST resource (`/<resource>` and `/<resource>/<id>`).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::transport::{ApiRequest, Transport};
use crate::types::errors::ApiError;
use crate::types::record::{merge_fields, Record, RecordId};

/// Keys under which list endpoints wrap their arrays.
const LIST_ENVELOPE_KEYS: [&str; 4] = ["jobs", "items", "data", "results"];

/// Client for a single resource on a backend.
#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    resource: String,
    bearer: Option<String>,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>, resource: &str) -> Self {
        Self {
            transport,
            resource: resource.trim_matches('/').to_string(),
            bearer: None,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Points the client at another resource (route parameter change).
    pub fn set_resource(&mut self, resource: &str) {
        self.resource = resource.trim_matches('/').to_string();
    }

    pub fn set_bearer(&mut self, token: Option<String>) {
        self.bearer = token;
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    fn item_path(&self, id: &RecordId) -> String {
        format!("{}/{}", self.resource, encode_segment(&id.as_key()))
    }

    /// `GET /<resource>` (or `list_path` when the endpoint differs).
    pub async fn list<R: DeserializeOwned>(
        &self,
        list_path: Option<&str>,
        params: &[(String, String)],
    ) -> Result<Vec<R>, ApiError> {
        let path = list_path.unwrap_or(&self.resource);
        let request = ApiRequest::get(path)
            .with_query(params)
            .with_bearer(self.bearer());
        let response = self.transport.send(request).await?.into_result()?;
        let body = response.body.unwrap_or(Value::Null);
        let array = unwrap_list(body)?;
        debug!(resource = %self.resource, count = array.len(), "fetched collection");
        array
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| ApiError::Decode(e.to_string())))
            .collect()
    }

    /// `GET /<resource>/<id>`.
    pub async fn get<R: DeserializeOwned>(&self, id: &RecordId) -> Result<R, ApiError> {
        let request = ApiRequest::get(self.item_path(id)).with_bearer(self.bearer());
        self.transport.send(request).await?.into_result()?.decode()
    }

    /// `PATCH /<resource>/<id>`.
    ///
    /// Returns the reply body as sent. Servers answer with the full record, a
    /// subset of its fields or nothing at all, so callers merge whatever
    /// object comes back over their own copy (see [`merge_reply`]).
    pub async fn update(&self, id: &RecordId, patch: &Value) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest::patch(self.item_path(id), patch.clone()).with_bearer(self.bearer());
        let response = self.transport.send(request).await?.into_result()?;
        Ok(response.body)
    }

    /// `DELETE /<resource>/<id>`.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        let request = ApiRequest::delete(self.item_path(id)).with_bearer(self.bearer());
        self.transport.send(request).await?.into_result()?;
        Ok(())
    }

    /// `POST /<resource>`; the created record must carry its assigned id.
    pub async fn create<R: DeserializeOwned>(
        &self,
        fields: &Value,
        idempotency_key: &str,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::post(self.resource.clone(), fields.clone())
            .with_bearer(self.bearer())
            .with_idempotency_key(idempotency_key);
        self.transport.send(request).await?.into_result()?.decode()
    }
}

/// Applies a PATCH to a local record: the sent fields first, then any fields
/// of an object reply. Fields neither side mentions keep their local values.
/// A reply that names a different id is ignored.
pub fn merge_reply<R: Record>(record: &R, patch: &Value, reply: Option<&Value>) -> Result<R, serde_json::Error> {
    let patched = merge_fields(record, patch)?;
    match reply {
        Some(body @ Value::Object(map)) => {
            let same_record = map
                .get("id")
                .and_then(RecordId::from_json)
                .map_or(true, |echoed| echoed == record.id());
            if same_record {
                merge_fields(&patched, body)
            } else {
                Ok(patched)
            }
        }
        _ => Ok(patched),
    }
}

/// Percent-encodes one path segment (RFC 3986 unreserved characters pass).
pub fn encode_segment(raw: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0xf) as usize]));
            }
        }
    }
    out
}

/// Inverse of [`encode_segment`]; malformed escapes are kept literally.
pub fn decode_segment(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn unwrap_list(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => LIST_ENVELOPE_KEYS
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| ApiError::Decode("expected a JSON array of records".to_string())),
        other => Err(ApiError::Decode(format!(
            "expected a JSON array of records, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
