use std::collections::HashMap;

use serde_json::Value;

use super::api::{ApiClient, ApiError, Method};

/// Responses of `GET` requests keyed by resource path. An invalidated key
/// is fetched again on its next read.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, Value>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the cached response for `key`, fetching it first when there
    /// is none. Failed fetches leave the cache untouched.
    pub fn fetch(&mut self, key: &str, api: &mut impl ApiClient) -> Result<&Value, ApiError> {
        if !self.entries.contains_key(key) {
            let value = api.request(Method::Get, key, None)?;
            self.entries.insert(key.to_string(), value);
        }
        self.entries
            .get(key)
            .ok_or_else(|| ApiError::Decode(format!("no cached response for {key}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cms::MemoryApi;

    #[test]
    fn reads_hit_the_api_once_until_invalidated() {
        let mut api = MemoryApi::new();
        api.seed("/api/things", vec![json!({"id": 1})]);
        let mut cache = QueryCache::new();

        assert_eq!(cache.fetch("/api/things", &mut api).expect("fetch"), &json!([{"id": 1}]));
        cache.fetch("/api/things", &mut api).expect("fetch");
        assert_eq!(api.requests().len(), 1);

        cache.invalidate("/api/things");
        assert!(!cache.contains("/api/things"));
        cache.fetch("/api/things", &mut api).expect("fetch");
        assert_eq!(api.requests().len(), 2);
    }

    #[test]
    fn failed_fetches_cache_nothing() {
        let mut api = MemoryApi::new();
        api.seed("/api/things", Vec::new());
        api.fail_next(Method::Get, "/api/things");
        let mut cache = QueryCache::new();
        assert!(cache.fetch("/api/things", &mut api).is_err());
        assert!(cache.get("/api/things").is_none());

        cache.put("/api/things", json!([]));
        assert_eq!(cache.get("/api/things"), Some(&json!([])));
    }
}
