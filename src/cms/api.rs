use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{method} {path} failed with status {status}")]
    Status {
        method: Method,
        path: String,
        status: u16,
    },
    #[error("{method} {path} could not be sent: {message}")]
    Transport {
        method: Method,
        path: String,
        message: String,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// The request function CMS screens use against the REST backend.
pub trait ApiClient {
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError>;
}

/// In-process stand-in for the REST backend: JSON collections keyed by
/// path, with numeric `id`s and one-shot failure injection.
#[derive(Debug, Default)]
pub struct MemoryApi {
    collections: BTreeMap<String, Vec<Value>>,
    next_id: u64,
    failures: Vec<(Method, String)>,
    log: Vec<(Method, String)>,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Adds `items` to the collection at `path`, keeping ids unique.
    pub fn seed(&mut self, path: &str, items: Vec<Value>) {
        for item in &items {
            if let Some(id) = item.get("id").and_then(Value::as_u64) {
                self.next_id = self.next_id.max(id + 1);
            }
        }
        self.collections.entry(path.to_string()).or_default().extend(items);
    }

    /// Makes the next `method` request to `path` fail with a server error.
    pub fn fail_next(&mut self, method: Method, path: &str) {
        self.failures.push((method, path.to_string()));
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> &[(Method, String)] {
        &self.log
    }

    fn split_item_path(path: &str) -> Option<(&str, u64)> {
        let (collection, id) = path.rsplit_once('/')?;
        Some((collection, id.parse().ok()?))
    }

    fn not_found(method: Method, path: &str) -> ApiError {
        ApiError::Status {
            method,
            path: path.to_string(),
            status: 404,
        }
    }

    fn find_item(&mut self, method: Method, path: &str) -> Result<(&mut Vec<Value>, usize), ApiError> {
        let (collection, id) = Self::split_item_path(path).ok_or_else(|| Self::not_found(method, path))?;
        let items = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(method, path))?;
        let idx = items
            .iter()
            .position(|item| item.get("id").and_then(Value::as_u64) == Some(id))
            .ok_or_else(|| Self::not_found(method, path))?;
        Ok((items, idx))
    }
}

fn object_body(method: Method, path: &str, body: Option<&Value>) -> Result<Map<String, Value>, ApiError> {
    match body {
        Some(Value::Object(map)) => Ok(map.clone()),
        _ => Err(ApiError::Status {
            method,
            path: path.to_string(),
            status: 400,
        }),
    }
}

impl ApiClient for MemoryApi {
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        debug!(%method, path, "api request");
        self.log.push((method, path.to_string()));
        if let Some(idx) = self
            .failures
            .iter()
            .position(|(failing, failing_path)| *failing == method && failing_path == path)
        {
            self.failures.remove(idx);
            return Err(ApiError::Status {
                method,
                path: path.to_string(),
                status: 500,
            });
        }

        match method {
            Method::Get => self
                .collections
                .get(path)
                .map(|items| Value::Array(items.clone()))
                .ok_or_else(|| Self::not_found(method, path)),
            Method::Post => {
                let mut item = object_body(method, path, body)?;
                item.insert("id".to_string(), Value::from(self.next_id));
                self.next_id += 1;
                let item = Value::Object(item);
                self.collections
                    .entry(path.to_string())
                    .or_default()
                    .push(item.clone());
                Ok(item)
            }
            Method::Patch => {
                let changes = object_body(method, path, body)?;
                let (items, idx) = self.find_item(method, path)?;
                if let Value::Object(item) = &mut items[idx] {
                    for (key, value) in changes {
                        if key != "id" {
                            item.insert(key, value);
                        }
                    }
                }
                Ok(items[idx].clone())
            }
            Method::Delete => {
                let (items, idx) = self.find_item(method, path)?;
                items.remove(idx);
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serves_a_small_rest_collection() {
        let mut api = MemoryApi::new();
        api.seed("/api/items", vec![json!({"id": 4, "name": "a"})]);

        let created = api
            .request(Method::Post, "/api/items", Some(&json!({"name": "b"})))
            .expect("post");
        assert_eq!(created["id"], json!(5));

        let patched = api
            .request(Method::Patch, "/api/items/4", Some(&json!({"name": "c", "id": 9})))
            .expect("patch");
        assert_eq!(patched, json!({"id": 4, "name": "c"}));

        api.request(Method::Delete, "/api/items/5", None).expect("delete");
        let listed = api.request(Method::Get, "/api/items", None).expect("get");
        assert_eq!(listed, json!([{"id": 4, "name": "c"}]));
        assert_eq!(api.requests().len(), 4);
    }

    #[test]
    fn injected_failures_fire_once() {
        let mut api = MemoryApi::new();
        api.seed("/api/items", vec![json!({"id": 1})]);
        api.fail_next(Method::Get, "/api/items");

        let err = api.request(Method::Get, "/api/items", None).unwrap_err();
        assert_eq!(err.to_string(), "GET /api/items failed with status 500");
        assert!(api.request(Method::Get, "/api/items", None).is_ok());
    }

    #[test]
    fn missing_items_are_not_found() {
        let mut api = MemoryApi::new();
        api.seed("/api/items", Vec::new());
        let err = api.request(Method::Delete, "/api/items/7", None).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        let err = api.request(Method::Post, "/api/items", Some(&json!([1]))).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
    }
}
