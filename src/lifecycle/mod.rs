//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Compile routes → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any configuration error is fatal before the listener binds
//! - Shutdown is broadcast so every long-running task can observe it

pub mod shutdown;

pub use shutdown::Shutdown;
