//! Captured path parameters.
//!
//! A fresh [`Params`] is built for every successful lookup and stored in the
//! request extensions before the handler runs.

use axum::body::Body;
use axum::http::Request;

static EMPTY: Params = Params { entries: Vec::new() };

/// Wildcard key name → captured path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters attached to a dispatched request.
    ///
    /// Never absent: requests that did not go through the router, or whose
    /// route has no wildcards, yield an empty map.
    pub fn of(req: &Request<Body>) -> &Params {
        req.extensions().get::<Params>().unwrap_or(&EMPTY)
    }

    /// Bind `key` to `value`, replacing an earlier binding of the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in capture order (shallowest segment first).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
