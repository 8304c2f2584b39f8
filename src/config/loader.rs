//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::http::registry::MiddlewareRegistry;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str, registry: &MiddlewareRegistry) -> Result<ServerConfig, LoadError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config, registry).map_err(LoadError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path, registry: &MiddlewareRegistry) -> Result<ServerConfig, LoadError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:0"

            [[routes]]
            name = "r1"

            [[routes.handlers]]
            handler = "dynamic_header"
            to_header = "Y"
            from_header = "X"
            "#,
            &MiddlewareRegistry::default(),
        )
        .unwrap();
        assert_eq!(config.routes.len(), 1);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("routes = 3", &MiddlewareRegistry::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_validation_message_lists_errors() {
        let err = parse_config(
            r#"
            [timeouts]
            request_secs = 0

            [[routes]]
            name = "r1"

            [[routes.handlers]]
            handler = "dynamic_header"
            directives = "from_header X"
            "#,
            &MiddlewareRegistry::default(),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("request_secs"));
        assert!(message.contains("missing destination"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/dynamic-headers.toml"), &MiddlewareRegistry::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
