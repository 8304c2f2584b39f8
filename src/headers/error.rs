//! Errors raised while configuring header mappings.

use thiserror::Error;

/// Failure to turn directives or structured fields into a usable mapping.
///
/// Every variant is fatal to route construction: a route whose handlers fail
/// to configure never starts serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown key {0}")]
    UnknownKey(String),

    #[error("missing destination: `to_header` is required")]
    MissingDestination,

    #[error("missing source: set `from_header` or `take_host`")]
    MissingSource,

    #[error("`{0}` requires a value")]
    MissingArgument(String),

    #[error("unexpected argument `{token}` after `{key}`")]
    UnexpectedArgument { key: String, token: String },

    #[error("unterminated quote on line {0}")]
    UnterminatedQuote(usize),

    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),

    #[error("invalid handler fields: {0}")]
    Structured(#[from] toml::de::Error),

    #[error("unknown handler `{0}`")]
    UnknownHandler(String),

    #[error("handler `{0}` sets both `directives` and structured fields")]
    AmbiguousHandler(String),
}
