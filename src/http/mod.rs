//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace/timeout layers)
//!     → request.rs (host extraction, shared by routing and middleware)
//!     → routing (match host / path prefix)
//!     → route service chain built by registry.rs
//!         → [dynamic_header middleware]* → fixed response
//!     → Send to client
//! ```

pub mod registry;
pub mod request;
pub mod server;

pub use registry::{MiddlewareRegistry, RouteLayer, RouteService, DYNAMIC_HEADER};
pub use server::{BuildError, HttpServer};
