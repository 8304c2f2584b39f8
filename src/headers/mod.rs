//! Dynamic header mapping subsystem.
//!
//! # Data Flow
//! ```text
//! Route setup:
//!     directive text ─→ directive.rs (tokenize) ─┐
//!     structured fields (serde) ─────────────────┴→ mapping.rs (configure, validate)
//!     → MappingConfig (immutable)
//!     → mapper.rs (HeaderMapper, shared via Arc)
//!
//! Per request:
//!     resolve source (named header | host)
//!     → next handler (request unchanged)
//!     → append destination header if a value was found
//! ```
//!
//! # Design Decisions
//! - All configuration errors surface at route setup, never per request
//! - A missing source value is a debug diagnostic, not an error
//! - Response headers are appended, never overwritten

pub mod directive;
pub mod error;
pub mod mapper;
pub mod mapping;

pub use directive::{parse_directives, Directive};
pub use error::ConfigError;
pub use mapper::{dynamic_header_middleware, HeaderMapper};
pub use mapping::{MappingBuilder, MappingConfig, SourceMode};
