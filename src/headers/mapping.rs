//! Header mapping configuration.
//!
//! # Responsibilities
//! - Apply ordered directives onto a builder (last write wins)
//! - Decode the same builder from structured handler fields
//! - Validate into an immutable `MappingConfig`
//!
//! # Design Decisions
//! - Header names are parsed into `HeaderName` up front, so lookups are
//!   case-insensitive and invalid names fail at route setup
//! - In structured form there is no ordering, so `take_host = true` wins over
//!   `from_header`

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::headers::directive::Directive;
use crate::headers::error::ConfigError;

pub const TO_HEADER: &str = "to_header";
pub const FROM_HEADER: &str = "from_header";
pub const TAKE_HOST: &str = "take_host";

/// Where the copied value is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    /// First value of the named request header.
    NamedHeader(HeaderName),
    /// The request's host.
    Host,
}

/// Validated, immutable mapping from a request source to a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConfig {
    source: SourceMode,
    destination: HeaderName,
}

impl MappingConfig {
    /// Parse directives and validate them in one step.
    pub fn from_directives<'a, I>(directives: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a Directive>,
    {
        let mut builder = MappingBuilder::default();
        builder.configure(directives)?;
        builder.validate()
    }

    pub fn source(&self) -> &SourceMode {
        &self.source
    }

    pub fn destination(&self) -> &HeaderName {
        &self.destination
    }
}

/// Partially configured mapping, populated by directives or decoded from
/// structured fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingBuilder {
    pub to_header: Option<String>,
    pub from_header: Option<String>,
    pub take_host: bool,
}

impl MappingBuilder {
    /// Decode structured handler fields.
    ///
    /// Keys are checked before decoding so an unrecognized field reports the
    /// same `UnknownKey` as an unrecognized directive.
    pub fn from_fields(fields: &toml::Table) -> Result<Self, ConfigError> {
        if let Some(key) = fields.keys().find(|k| ![TO_HEADER, FROM_HEADER, TAKE_HOST].contains(&k.as_str())) {
            return Err(ConfigError::UnknownKey(key.clone()));
        }
        Ok(toml::Value::Table(fields.clone()).try_into()?)
    }

    /// Apply directives in order.
    ///
    /// Stops at the first bad directive. Fields set by earlier directives stay
    /// populated.
    pub fn configure<'a, I>(&mut self, directives: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = &'a Directive>,
    {
        for directive in directives {
            match directive.key.as_str() {
                TO_HEADER => {
                    self.to_header = Some(single_arg(directive)?);
                }
                FROM_HEADER => {
                    self.from_header = Some(single_arg(directive)?);
                    self.take_host = false;
                }
                TAKE_HOST => {
                    if let Some(token) = directive.args.first() {
                        return Err(ConfigError::UnexpectedArgument {
                            key: directive.key.clone(),
                            token: token.clone(),
                        });
                    }
                    self.take_host = true;
                }
                other => return Err(ConfigError::UnknownKey(other.to_string())),
            }
        }
        Ok(())
    }

    /// Check that a destination and a source are both resolvable.
    pub fn validate(&self) -> Result<MappingConfig, ConfigError> {
        let destination = match self.to_header.as_deref() {
            Some(name) if !name.is_empty() => parse_name(name)?,
            _ => return Err(ConfigError::MissingDestination),
        };

        let source = if self.take_host {
            SourceMode::Host
        } else {
            match self.from_header.as_deref() {
                Some(name) if !name.is_empty() => SourceMode::NamedHeader(parse_name(name)?),
                _ => return Err(ConfigError::MissingSource),
            }
        };

        Ok(MappingConfig { source, destination })
    }
}

fn single_arg(directive: &Directive) -> Result<String, ConfigError> {
    match directive.args.as_slice() {
        [value] => Ok(value.clone()),
        [] => Err(ConfigError::MissingArgument(directive.key.clone())),
        [_, extra, ..] => Err(ConfigError::UnexpectedArgument {
            key: directive.key.clone(),
            token: extra.clone(),
        }),
    }
}

fn parse_name(name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))
}
