//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the header mapping server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, each with its own middleware chain.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A route: match conditions, a middleware chain and a fixed response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// Host to match (exact, case-insensitive).
    pub host: Option<String>,

    /// Path prefix to match.
    pub path_prefix: Option<String>,

    /// Route priority (higher = checked first).
    pub priority: u32,

    /// Status code of the terminal response.
    pub status: u16,

    /// Body of the terminal response.
    pub body: String,

    /// Middleware applied in order, outermost first.
    pub handlers: Vec<HandlerConfig>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            host: None,
            path_prefix: None,
            priority: 0,
            status: 200,
            body: String::new(),
            handlers: Vec::new(),
        }
    }
}

/// One middleware instance within a route.
///
/// Configured either through `directives` text or through structured fields
/// flattened into the same table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Registered handler name (e.g. "dynamic_header").
    pub handler: String,

    /// Declarative directive text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directives: Option<String>,

    /// Remaining structured fields, decoded by the handler's factory.
    #[serde(flatten)]
    pub fields: toml::Table,
}
