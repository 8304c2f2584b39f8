//! Diagnostic sink handed to middleware.
//!
//! Middleware reports through a `DiagnosticSink` rather than calling
//! `tracing` directly, so a route can route its messages elsewhere and tests
//! can assert on what was reported. Reporting is fire-and-forget.

use std::sync::Arc;

/// Leveled, best-effort message sink.
pub trait DiagnosticSink: Send + Sync + std::fmt::Debug {
    fn debug(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards diagnostics to the global `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingSink {
    route: Arc<str>,
}

impl TracingSink {
    /// Sink tagging every event with the owning route's name.
    pub fn for_route(route: impl Into<Arc<str>>) -> Self {
        Self { route: route.into() }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::for_route("-")
    }
}

impl DiagnosticSink for TracingSink {
    fn debug(&self, message: &str) {
        tracing::debug!(route = %self.route, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(route = %self.route, "{}", message);
    }
}
