//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched Route or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Compile matchers
//!     → Sort by priority
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
