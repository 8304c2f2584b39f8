//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Routes sorted by priority, highest first; ties keep config order
//! - First match wins

use axum::body::Body;
use axum::http::Request;

use crate::config::RouteConfig;
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, PathPrefixMatcher};

/// A compiled route: its match conditions plus whatever it dispatches to.
#[derive(Debug)]
pub struct Route<T> {
    pub name: String,
    pub priority: u32,
    matcher: AndMatcher,
    pub target: T,
}

impl<T> Route<T> {
    /// Compile the match conditions of `config`.
    pub fn from_config(config: &RouteConfig, target: T) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        if let Some(host) = &config.host {
            matchers.push(Box::new(HostMatcher::new(host.clone())));
        }
        if let Some(prefix) = &config.path_prefix {
            matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }

        Self {
            name: config.name.clone(),
            priority: config.priority,
            matcher: AndMatcher::new(matchers),
            target,
        }
    }

    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }
}

/// Priority-ordered route table.
#[derive(Debug)]
pub struct Router<T> {
    routes: Vec<Route<T>>,
}

impl<T> Router<T> {
    pub fn new(mut routes: Vec<Route<T>>) -> Self {
        routes.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { routes }
    }

    /// Find the first route matching `req`.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Route<T>> {
        self.routes.iter().find(|route| route.matches(req))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, host: Option<&str>, prefix: Option<&str>, priority: u32) -> Route<String> {
        let config = RouteConfig {
            name: name.to_string(),
            host: host.map(str::to_string),
            path_prefix: prefix.map(str::to_string),
            priority,
            ..RouteConfig::default()
        };
        Route::from_config(&config, name.to_uppercase())
    }

    fn request(host: &str, path: &str) -> Request<Body> {
        Request::builder().uri(path).header("Host", host).body(Body::default()).unwrap()
    }

    #[test]
    fn test_priority_order() {
        let router = Router::new(vec![
            route("catch-all", None, None, 0),
            route("api", None, Some("/api"), 10),
        ]);

        assert_eq!(router.match_request(&request("a.test", "/api/x")).unwrap().target, "API");
        assert_eq!(router.match_request(&request("a.test", "/home")).unwrap().target, "CATCH-ALL");
    }

    #[test]
    fn test_ties_keep_config_order() {
        let router = Router::new(vec![route("first", None, None, 5), route("second", None, None, 5)]);
        assert_eq!(router.match_request(&request("a.test", "/")).unwrap().name, "first");
    }

    #[test]
    fn test_no_match() {
        let router = Router::new(vec![route("only", Some("example.com"), None, 0)]);
        assert!(router.match_request(&request("other.com", "/")).is_none());
        assert_eq!(router.len(), 1);
    }
}
