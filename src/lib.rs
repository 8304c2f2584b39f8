//! Dynamic response headers.
//!
//! An HTTP middleware that copies a request header, or the request host,
//! into a response header, plus a small configurable server that hosts it
//! on priority-ordered routes.

pub mod config;
pub mod headers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use headers::{ConfigError, HeaderMapper, MappingConfig, SourceMode};
pub use http::{HttpServer, MiddlewareRegistry};
pub use lifecycle::Shutdown;
