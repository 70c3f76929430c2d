//! Per-segment routing trie.
//!
//! # Responsibilities
//! - Store routes keyed by (method, pattern), one node per path segment
//! - Match request paths, capturing wildcard segments
//!
//! # Design Decisions
//! - The method is segment zero, so each method gets its own subtree under
//!   a shared root
//! - Children keep insertion order
//! - A literal child always wins over the wildcard sibling, whichever was
//!   inserted first
//! - At most one wildcard child per position; captured values are bound
//!   under the matched route's own key names
//! - Greedy walk: once a literal child is taken the search never backs up
//!   to try the wildcard sibling
//! - A trailing '/' yields an extra empty segment (`/a/` ≠ `/a`)
//! - Segments are matched on the raw path; captured values are
//!   percent-decoded

use std::fmt;

use std::borrow::Cow;

use axum::http::Method;
use percent_encoding::percent_decode_str;

use crate::http::handler::BoxHandler;
use crate::routing::params::Params;

/// A registered route: method, original pattern and handler.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: String,
    handler: BoxHandler,
    /// (segment depth, key name) for every wildcard in `pattern`.
    keys: Vec<(usize, String)>,
}

impl Route {
    pub fn new(method: Method, pattern: impl Into<String>, handler: BoxHandler) -> Self {
        let pattern = pattern.into();
        let keys = segments(&pattern)
            .enumerate()
            .filter_map(|(depth, segment)| wildcard_key(segment).map(|key| (depth, key.to_owned())))
            .collect();
        Self {
            method,
            pattern,
            handler,
            keys,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    fn bind(&self, captured: &[(usize, &str, &str)]) -> Params {
        captured
            .iter()
            .map(|&(depth, node_key, value)| {
                let key = self
                    .keys
                    .iter()
                    .find(|(d, _)| *d == depth)
                    .map(|(_, k)| k.as_str())
                    .unwrap_or(node_key);
                (key, decode(value))
            })
            .collect()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Result of a successful [`Node::search`].
#[derive(Debug)]
pub struct Match<'a> {
    pub route: &'a Route,
    pub params: Params,
}

/// One path segment of the trie.
#[derive(Debug, Default)]
pub struct Node {
    part: String,
    children: Vec<Node>,
    wildcard: bool,
    key: String,
    route: Option<Route>,
}

impl Node {
    /// Create an empty root.
    pub fn new() -> Self {
        Self::default()
    }

    fn segment(part: &str, wildcard: bool) -> Self {
        let key = if wildcard {
            wildcard_key(part).unwrap_or_default().to_owned()
        } else {
            String::new()
        };
        Self {
            part: part.to_owned(),
            wildcard,
            key,
            ..Self::default()
        }
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Store `route` at (method, pattern), returning the route it replaced.
    pub fn insert(&mut self, method: &str, pattern: &str, route: Route) -> Option<Route> {
        let mut node = self.child_mut(method, false);
        for segment in segments(pattern) {
            node = node.child_mut(segment, is_wildcard(segment));
        }
        node.route.replace(route)
    }

    /// The route stored at exactly this (method, pattern), if any.
    ///
    /// Wildcard segments match the position's wildcard node whatever its
    /// key, so `/a/:x` finds a route registered as `/a/:y`.
    pub fn find(&self, method: &str, pattern: &str) -> Option<&Route> {
        let mut node = self.child(method, false)?;
        for segment in segments(pattern) {
            node = node.child(segment, is_wildcard(segment))?;
        }
        node.route.as_ref()
    }

    /// Match a request path. A miss is `None`, never an error.
    pub fn search(&self, method: &str, path: &str) -> Option<Match<'_>> {
        let mut node = self.child(method, false)?;
        let mut captured = Vec::new();
        for (depth, segment) in segments(path).enumerate() {
            node = match node.child(segment, false) {
                Some(child) => child,
                None => {
                    let child = node.children.iter().find(|c| c.wildcard)?;
                    captured.push((depth, child.key.as_str(), segment));
                    child
                }
            };
        }
        let route = node.route.as_ref()?;
        Some(Match {
            route,
            params: route.bind(&captured),
        })
    }

    fn child(&self, segment: &str, wildcard: bool) -> Option<&Node> {
        self.children
            .iter()
            .find(|child| child.accepts(segment, wildcard))
    }

    fn child_mut(&mut self, segment: &str, wildcard: bool) -> &mut Node {
        let idx = match self
            .children
            .iter()
            .position(|child| child.accepts(segment, wildcard))
        {
            Some(idx) => idx,
            None => {
                self.children.push(Node::segment(segment, wildcard));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn accepts(&self, segment: &str, wildcard: bool) -> bool {
        if wildcard {
            self.wildcard
        } else {
            !self.wildcard && self.part == segment
        }
    }
}

/// Percent-decode a captured segment. Invalid UTF-8 keeps the raw text.
fn decode(value: &str) -> Cow<'_, str> {
    percent_decode_str(value)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(value))
}

/// Segments after the leading '/': `"/a/b/"` → `["a", "b", ""]`.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').skip(1)
}

pub(crate) fn is_wildcard(segment: &str) -> bool {
    wildcard_key(segment).is_some()
}

/// Key name of a wildcard segment (`:id`, `*id`, `{id}`).
pub(crate) fn wildcard_key(segment: &str) -> Option<&str> {
    if let Some(key) = segment.strip_prefix(':').or_else(|| segment.strip_prefix('*')) {
        return Some(key);
    }
    if segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}') {
        return Some(&segment[1..segment.len() - 1]);
    }
    None
}
