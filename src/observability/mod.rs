//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Subsystems produce:
//!     → tracing events (structured fields)
//!     → diagnostics.rs (middleware diagnostics, forwarded to tracing)
//!
//! logging.rs installs the subscriber that consumes them.
//! ```

pub mod diagnostics;
pub mod logging;

pub use diagnostics::{DiagnosticSink, TracingSink};
