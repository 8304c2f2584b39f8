//! Route matching logic.
//!
//! # Responsibilities
//! - Match host (exact, case-insensitive, port ignored)
//! - Match path prefix (case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host comes from `http::request::request_host` (URI authority first,
//!   then the Host header), the same source the header mapper copies
//! - Empty condition list = always matches (wildcard)

use axum::body::Body;
use axum::http::Request;

use crate::http::request::request_host;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request host.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        request_host(req)
            .is_some_and(|h| strip_port(&h).eq_ignore_ascii_case(&self.expected_host))
    }
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literals keep their colons.
    if let Some(end) = host.rfind(']') {
        return &host[..=end];
    }
    host.split(':').next().unwrap_or(host)
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}
