//! Dynamic header middleware.
//! Copies a request header (or the request host) into a response header.

use axum::{
    body::Body,
    extract::State,
    http::{header::HOST, HeaderMap, HeaderValue, Request},
    middleware::{from_fn_with_state, Next},
    response::Response,
};
use std::sync::Arc;
use tower::{util::BoxCloneSyncService, Layer};

use crate::headers::mapping::{MappingConfig, SourceMode};
use crate::http::registry::{RouteLayer, RouteService};
use crate::http::request::request_host;
use crate::observability::diagnostics::{DiagnosticSink, TracingSink};

/// Per-route header mapper. Immutable once built and shared across requests.
#[derive(Debug)]
pub struct HeaderMapper {
    config: MappingConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl HeaderMapper {
    pub fn new(config: MappingConfig) -> Self {
        Self::with_diagnostics(config, Arc::new(TracingSink::default()))
    }

    pub fn with_diagnostics(config: MappingConfig, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, diagnostics }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Resolve the value to copy from the request, if any.
    ///
    /// Only the first value of a multi-valued source header is used. Empty
    /// values count as absent.
    pub fn resolve<B>(&self, request: &Request<B>) -> Option<HeaderValue> {
        let candidate = match self.config.source() {
            SourceMode::NamedHeader(name) => request.headers().get(name).cloned(),
            SourceMode::Host => self.host_value(request),
        };

        match candidate {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                self.diagnostics.debug(&format!(
                    "no value for {}, leaving {} unset",
                    self.source_label(),
                    self.config.destination()
                ));
                None
            }
        }
    }

    /// Append `value` under the destination name, keeping existing values.
    pub fn apply(&self, headers: &mut HeaderMap, value: HeaderValue) {
        headers.append(self.config.destination().clone(), value);
    }

    /// Wrap `inner` so every request through it is mapped by `self`.
    pub fn layer(self: &Arc<Self>, inner: RouteService) -> RouteService {
        BoxCloneSyncService::new(from_fn_with_state(Arc::clone(self), dynamic_header_middleware).layer(inner))
    }

    /// Package this mapper as a route layer for the middleware registry.
    pub fn into_route_layer(self) -> RouteLayer {
        let mapper = Arc::new(self);
        Arc::new(move |inner: RouteService| mapper.layer(inner))
    }

    fn host_value<B>(&self, request: &Request<B>) -> Option<HeaderValue> {
        match request_host(request) {
            // Authority hosts, ports and textual Host headers are all visible ASCII.
            Some(host) => HeaderValue::from_str(&host).ok(),
            None => {
                if let Some(raw) = request.headers().get(HOST) {
                    self.diagnostics
                        .error(&format!("Host header {:?} is not visible ASCII, ignoring it", raw));
                }
                None
            }
        }
    }

    fn source_label(&self) -> String {
        match self.config.source() {
            SourceMode::NamedHeader(name) => format!("request header {}", name),
            SourceMode::Host => "request host".to_string(),
        }
    }
}

/// Axum middleware running a `HeaderMapper` around the rest of the chain.
///
/// The request is forwarded untouched and the downstream response is
/// returned as-is apart from the appended header.
pub async fn dynamic_header_middleware(
    State(mapper): State<Arc<HeaderMapper>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let value = mapper.resolve(&req);
    let mut response = next.run(req).await;
    if let Some(value) = value {
        mapper.apply(response.headers_mut(), value);
    }
    response
}
