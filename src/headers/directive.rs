//! Declarative directive dialect.
//!
//! ```text
//! # copy the caller's tag back
//! from_header X-Client-Tag
//! to_header   "X-Echo-Tag"
//! ```
//!
//! One directive per line: a key followed by zero or more whitespace
//! separated arguments. Double quotes group whitespace into a single token,
//! `\"` escapes a quote inside them, and `#` comments out the rest of a line.

use crate::headers::error::ConfigError;

/// A single key with its argument tokens, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub key: String,
    pub args: Vec<String>,
    /// 1-based line the directive came from. Zero for directives built in code.
    pub line: usize,
}

impl Directive {
    /// Build a directive outside of the text dialect.
    pub fn new<K, I, A>(key: K, args: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            key: key.into(),
            args: args.into_iter().map(Into::into).collect(),
            line: 0,
        }
    }

    /// A directive that takes no arguments, such as `take_host`.
    pub fn flag(key: impl Into<String>) -> Self {
        Self::new(key, std::iter::empty::<String>())
    }
}

/// Tokenize directive text into an ordered list of directives.
pub fn parse_directives(text: &str) -> Result<Vec<Directive>, ConfigError> {
    let mut directives = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let mut tokens = tokenize_line(raw, line)?.into_iter();
        if let Some(key) = tokens.next() {
            directives.push(Directive {
                key,
                args: tokens.collect(),
                line,
            });
        }
    }

    Ok(directives)
}

fn tokenize_line(raw: &str, line: usize) -> Result<Vec<String>, ConfigError> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '#' {
            break;
        }

        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' if chars.peek() == Some(&'"') => {
                        chars.next();
                        token.push('"');
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err(ConfigError::UnterminatedQuote(line));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}
