//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, bind address)
//! - Check route names are present and unique
//! - Build every route handler once so middleware errors surface before startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of the config and the registry

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::headers::ConfigError;
use crate::http::registry::MiddlewareRegistry;

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("route #{0} has no name")]
    UnnamedRoute(usize),

    #[error("route `{0}` is defined more than once")]
    DuplicateRoute(String),

    #[error("route `{route}`: status {status} is not a valid HTTP status")]
    Status { route: String, status: u16 },

    #[error("route `{route}`: path_prefix `{prefix}` must start with '/'")]
    PathPrefix { route: String, prefix: String },

    #[error("route `{route}`, handler #{index}: {source}")]
    Handler {
        route: String,
        index: usize,
        #[source]
        source: ConfigError,
    },
}

/// Validate `config`, collecting every error.
pub fn validate_config(config: &ServerConfig, registry: &MiddlewareRegistry) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::UnnamedRoute(i));
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }

        if StatusCode::from_u16(route.status).is_err() {
            errors.push(ValidationError::Status {
                route: route.name.clone(),
                status: route.status,
            });
        }

        if let Some(prefix) = &route.path_prefix {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::PathPrefix {
                    route: route.name.clone(),
                    prefix: prefix.clone(),
                });
            }
        }

        for (index, handler) in route.handlers.iter().enumerate() {
            if let Err(source) = registry.build(&route.name, handler) {
                errors.push(ValidationError::Handler {
                    route: route.name.clone(),
                    index,
                    source,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
