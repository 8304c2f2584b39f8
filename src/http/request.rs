//! Request inspection.
//!
//! # Responsibilities
//! - Extract routing-relevant information (host)
//!
//! # Design Decisions
//! - Absolute-form targets carry the host in the URI authority, which wins
//!   over the Host header (RFC 7230 §5.4)
//! - Userinfo is never part of the host

use std::borrow::Cow;

use axum::http::{header::HOST, uri::Authority, Request};

/// Host of `req`, including the port when one was given.
///
/// Returns `None` when the request has no authority and no Host header, or
/// when the Host header is not visible ASCII.
pub fn request_host<B>(req: &Request<B>) -> Option<Cow<'_, str>> {
    if let Some(authority) = req.uri().authority() {
        return Some(authority_host(authority));
    }
    req.headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(Cow::Borrowed)
}

fn authority_host(authority: &Authority) -> Cow<'_, str> {
    match authority.port() {
        Some(port) => Cow::Owned(format!("{}:{}", authority.host(), port)),
        None => Cow::Borrowed(authority.host()),
    }
}
