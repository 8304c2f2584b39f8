//! Named middleware factories.
//!
//! # Responsibilities
//! - Map a handler name from route config to a factory
//! - Hand each factory its configuration, either directive text or structured
//!   fields
//! - Produce a `RouteLayer` that wraps the route's inner service
//!
//! # Design Decisions
//! - Registration is explicit (no global state); `Default` registers the
//!   built-in handlers
//! - Factories are side-effect free so validation can dry-run them; any
//!   error refuses the route

use axum::{body::Body, http::Request, response::Response};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tower::util::BoxCloneSyncService;

use crate::config::schema::HandlerConfig;
use crate::headers::{parse_directives, ConfigError, HeaderMapper, MappingBuilder};
use crate::observability::diagnostics::TracingSink;

/// Name the header mapper is registered under.
pub const DYNAMIC_HEADER: &str = "dynamic_header";

/// Type-erased per-route service chain.
pub type RouteService = BoxCloneSyncService<Request<Body>, Response, Infallible>;

/// Wraps a route service with one more middleware.
pub type RouteLayer = Arc<dyn Fn(RouteService) -> RouteService + Send + Sync>;

/// Configuration handed to a factory.
#[derive(Debug, Clone, Copy)]
pub enum HandlerSource<'a> {
    /// Declarative directive text.
    Directives(&'a str),
    /// Structured fields from the handler table.
    Structured(&'a toml::Table),
}

/// Everything a factory gets to build one middleware instance.
#[derive(Debug, Clone, Copy)]
pub struct FactoryContext<'a> {
    /// Name of the owning route, for diagnostics.
    pub route: &'a str,
    pub source: HandlerSource<'a>,
}

pub type MiddlewareFactory = fn(&FactoryContext<'_>) -> Result<RouteLayer, ConfigError>;

/// Registry of middleware factories keyed by handler name.
#[derive(Clone)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, MiddlewareFactory>,
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl MiddlewareRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `factory` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, factory: MiddlewareFactory) -> &mut Self {
        let name = name.into();
        tracing::debug!(handler = %name, "Registering middleware factory");
        self.factories.insert(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the middleware described by `handler` for route `route`.
    pub fn build(&self, route: &str, handler: &HandlerConfig) -> Result<RouteLayer, ConfigError> {
        let factory = self
            .factories
            .get(&handler.handler)
            .ok_or_else(|| ConfigError::UnknownHandler(handler.handler.clone()))?;

        let source = match (&handler.directives, handler.fields.is_empty()) {
            (Some(_), false) => return Err(ConfigError::AmbiguousHandler(handler.handler.clone())),
            (Some(text), true) => HandlerSource::Directives(text),
            (None, _) => HandlerSource::Structured(&handler.fields),
        };

        factory(&FactoryContext { route, source })
    }
}

impl Default for MiddlewareRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DYNAMIC_HEADER, dynamic_header_factory);
        registry
    }
}

/// Factory for the `dynamic_header` handler.
pub fn dynamic_header_factory(ctx: &FactoryContext<'_>) -> Result<RouteLayer, ConfigError> {
    let builder = match ctx.source {
        HandlerSource::Directives(text) => {
            let mut builder = MappingBuilder::default();
            builder.configure(&parse_directives(text)?)?;
            builder
        }
        HandlerSource::Structured(fields) => MappingBuilder::from_fields(fields)?,
    };
    let config = builder.validate()?;
    let mapper = HeaderMapper::with_diagnostics(config, Arc::new(TracingSink::for_route(ctx.route)));
    Ok(mapper.into_route_layer())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(toml_src: &str) -> HandlerConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn test_default_registers_dynamic_header() {
        assert!(MiddlewareRegistry::default().contains(DYNAMIC_HEADER));
        assert!(!MiddlewareRegistry::empty().contains(DYNAMIC_HEADER));
    }

    #[test]
    fn test_build_from_directives() {
        let registry = MiddlewareRegistry::default();
        let h = handler("handler = \"dynamic_header\"\ndirectives = \"from_header X\\nto_header Y\"");
        assert!(registry.build("r1", &h).is_ok());
    }

    #[test]
    fn test_build_from_structured_fields() {
        let registry = MiddlewareRegistry::default();
        let h = handler("handler = \"dynamic_header\"\nto_header = \"Y\"\ntake_host = true");
        assert!(registry.build("r1", &h).is_ok());
    }

    #[test]
    fn test_build_errors() {
        let registry = MiddlewareRegistry::default();

        let h = handler("handler = \"rate_limit\"");
        assert!(matches!(registry.build("r1", &h), Err(ConfigError::UnknownHandler(_))));

        let h = handler("handler = \"dynamic_header\"\ndirectives = \"to_header Y\"");
        assert!(matches!(registry.build("r1", &h), Err(ConfigError::MissingSource)));

        let h = handler("handler = \"dynamic_header\"\ndirectives = \"redis_url x\"");
        assert!(matches!(registry.build("r1", &h), Err(ConfigError::UnknownKey(_))));

        let h = handler("handler = \"dynamic_header\"\nto_header = \"Y\"\nredis_url = \"x\"");
        assert!(matches!(registry.build("r1", &h), Err(ConfigError::UnknownKey(ref key)) if key == "redis_url"));

        let h = handler("handler = \"dynamic_header\"\ndirectives = \"take_host\"\nto_header = \"Y\"");
        assert!(matches!(registry.build("r1", &h), Err(ConfigError::AmbiguousHandler(_))));
    }

    #[test]
    fn test_register_custom_factory() {
        fn passthrough(_: &FactoryContext<'_>) -> Result<RouteLayer, ConfigError> {
            Ok(Arc::new(|inner: RouteService| inner))
        }

        let mut registry = MiddlewareRegistry::empty();
        registry.register("passthrough", passthrough);
        assert!(registry.build("r1", &handler("handler = \"passthrough\"")).is_ok());
    }
}
