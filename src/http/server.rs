//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile every route into a tower service chain
//! - Create the Axum Router and dispatch requests to the matched route
//! - Wire up cross-cutting middleware (tracing, timeouts)
//! - Serve until shutdown

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{service_fn, util::BoxCloneSyncService, ServiceExt};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{RouteConfig, ServerConfig};
use crate::headers::ConfigError;
use crate::http::registry::{MiddlewareRegistry, RouteService};
use crate::routing::{Route, Router as RouteTable};

/// Route setup failure. The server refuses to start.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("route `{route}`, handler `{handler}`: {source}")]
    Handler {
        route: String,
        handler: String,
        #[source]
        source: ConfigError,
    },

    #[error("route `{route}`: invalid status {status}")]
    Status { route: String, status: u16 },
}

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable<RouteService>>,
}

/// HTTP server hosting the configured routes.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Compile all routes in `config`, building their middleware through
    /// `registry`.
    pub fn new(config: ServerConfig, registry: &MiddlewareRegistry) -> Result<Self, BuildError> {
        let routes = config
            .routes
            .iter()
            .map(|route| -> Result<_, BuildError> {
                Ok(Route::from_config(route, compile_route(route, registry)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let state = AppState {
            routes: Arc::new(RouteTable::new(routes)),
        };
        tracing::info!(routes = state.routes.len(), "Routes compiled");

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or Ctrl+C is received.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = ctrl_c() => tracing::info!("Shutdown signal received"),
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The compiled router, for serving in-process.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Wrap the route's fixed response in its handlers, first handler outermost.
fn compile_route(route: &RouteConfig, registry: &MiddlewareRegistry) -> Result<RouteService, BuildError> {
    let status = StatusCode::from_u16(route.status).map_err(|_| BuildError::Status {
        route: route.name.clone(),
        status: route.status,
    })?;
    let body = route.body.clone();

    let mut service: RouteService = BoxCloneSyncService::new(service_fn(move |_req: Request<Body>| {
        let body = body.clone();
        async move { Ok::<_, Infallible>((status, body).into_response()) }
    }));

    for handler in route.handlers.iter().rev() {
        let layer = registry.build(&route.name, handler).map_err(|source| BuildError::Handler {
            route: route.name.clone(),
            handler: handler.handler.clone(),
            source,
        })?;
        service = layer(service);
        tracing::debug!(route = %route.name, handler = %handler.handler, "Handler installed");
    }

    Ok(service)
}

/// Look up the route for `request` and run its service chain.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let Some(route) = state.routes.match_request(&request) else {
        tracing::warn!(path = %request.uri().path(), "No route matched");
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    tracing::debug!(route = %route.name, path = %request.uri().path(), "Dispatching request");
    match route.target.clone().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

/// Wait for Ctrl+C. If the handler cannot be installed, wait forever and
/// rely on the shutdown channel instead.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerConfig;

    fn handler(directives: &str) -> HandlerConfig {
        HandlerConfig {
            handler: "dynamic_header".to_string(),
            directives: Some(directives.to_string()),
            fields: toml::Table::new(),
        }
    }

    fn server(routes: Vec<RouteConfig>) -> Router {
        let config = ServerConfig {
            routes,
            ..ServerConfig::default()
        };
        HttpServer::new(config, &MiddlewareRegistry::default()).unwrap().into_router()
    }

    #[tokio::test]
    async fn test_route_with_two_mappings() {
        let app = server(vec![RouteConfig {
            name: "r1".into(),
            status: 202,
            body: "hello".into(),
            handlers: vec![handler("from_header X-A\nto_header Y"), handler("take_host\nto_header Y")],
            ..RouteConfig::default()
        }]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("host", "example.com")
                    .header("x-a", "abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        // Inner handler appends first, outer handler last.
        let values: Vec<_> = response.headers().get_all("y").iter().collect();
        assert_eq!(values, vec!["example.com", "abc"]);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_no_route_is_404() {
        let app = server(vec![RouteConfig {
            name: "r1".into(),
            host: Some("example.com".into()),
            ..RouteConfig::default()
        }]);

        let response = app
            .oneshot(Request::builder().uri("/").header("host", "other.com").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_each_handler_built_once() {
        use crate::http::registry::{FactoryContext, RouteLayer};
        use std::sync::atomic::{AtomicUsize, Ordering};

        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        fn counting(_: &FactoryContext<'_>) -> Result<RouteLayer, ConfigError> {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(|inner: RouteService| inner))
        }

        let mut registry = MiddlewareRegistry::empty();
        registry.register("counting", counting);

        let counted = HandlerConfig {
            handler: "counting".to_string(),
            directives: None,
            fields: toml::Table::new(),
        };
        let config = ServerConfig {
            routes: vec![
                RouteConfig {
                    name: "r1".into(),
                    handlers: vec![counted.clone(), counted.clone()],
                    ..RouteConfig::default()
                },
                RouteConfig {
                    name: "r2".into(),
                    handlers: vec![counted],
                    ..RouteConfig::default()
                },
            ],
            ..ServerConfig::default()
        };

        assert!(HttpServer::new(config, &registry).is_ok());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_bad_handler_refuses_to_build() {
        let config = ServerConfig {
            routes: vec![RouteConfig {
                name: "r1".into(),
                handlers: vec![handler("to_header Y")],
                ..RouteConfig::default()
            }],
            ..ServerConfig::default()
        };

        let err = HttpServer::new(config, &MiddlewareRegistry::default()).err().unwrap();
        assert!(matches!(err, BuildError::Handler { source: ConfigError::MissingSource, .. }));
    }
}
