//! Deciding whether a Web route answers with HTML or with a JSON envelope.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{self, AsHeaderName},
        request::Parts,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Html,
}

impl ResponseMode {
    /// Script-issued requests get JSON. Otherwise HTML is served only to clients that ask
    /// for it.
    pub fn negotiate(headers: &HeaderMap) -> Self {
        let json_body = header_str(headers, header::CONTENT_TYPE)
            .to_ascii_lowercase()
            .starts_with("application/json");
        let xhr = header_str(headers, "x-requested-with").eq_ignore_ascii_case("XMLHttpRequest");
        if json_body || xhr {
            return ResponseMode::Json;
        }

        if header_str(headers, header::ACCEPT).to_ascii_lowercase().contains("text/html") {
            ResponseMode::Html
        } else {
            ResponseMode::Json
        }
    }
}

fn header_str(headers: &HeaderMap, name: impl AsHeaderName) -> &str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

impl<S> FromRequestParts<S> for ResponseMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::negotiate(&parts.headers))
    }
}
