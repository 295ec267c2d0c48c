//! Request payloads for creating and updating books, and the required-field check shared
//! by both HTTP surfaces.

use std::{collections::HashMap, fmt};

use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, Request, rejection::FormRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    api::Envelope,
    model::{BookFields, Year},
};

/// A field every book must carry, in the order it is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    AuthorName,
    Year,
}

impl RequiredField {
    pub const ALL: [RequiredField; 3] = [RequiredField::Title, RequiredField::AuthorName, RequiredField::Year];

    pub fn key(self) -> &'static str {
        match self {
            RequiredField::Title => "title",
            RequiredField::AuthorName => "author_name",
            RequiredField::Year => "year",
        }
    }

    /// Key older form posts use for the same field.
    pub fn legacy_key(self) -> &'static str {
        match self {
            RequiredField::Title => "book_title",
            RequiredField::AuthorName => "book_author",
            RequiredField::Year => "book_year",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RequiredField::Title => "Title is required",
            RequiredField::AuthorName => "Author name is required",
            RequiredField::Year => "Year is required",
        }
    }
}

/// The required fields a payload lacked, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(Vec<RequiredField>);

impl MissingFields {
    pub fn fields(&self) -> &[RequiredField] {
        &self.0
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(field.message())?;
        }

        Ok(())
    }
}

/// Loosely typed create/update payload, as decoded from JSON or a form post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPayload {
    values: Map<String, Value>,
}

impl BookPayload {
    /// Anything other than a JSON object carries no fields.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn from_form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), Value::String(value.into())))
                .collect(),
        }
    }

    /// The value for `field`, preferring the canonical key when it is truthy.
    pub fn resolve(&self, field: RequiredField) -> Option<&Value> {
        [field.key(), field.legacy_key()]
            .into_iter()
            .filter_map(|key| self.values.get(key))
            .find(|value| is_truthy(value))
    }

    /// Checks every required field and returns the resolved values, or all the missing ones.
    pub fn validate(&self) -> Result<BookFields, MissingFields> {
        match (
            self.resolve(RequiredField::Title),
            self.resolve(RequiredField::AuthorName),
            self.resolve(RequiredField::Year),
        ) {
            (Some(title), Some(author_name), Some(year)) => Ok(BookFields {
                title: text_of(title),
                author_name: text_of(author_name),
                year: year_of(year),
            }),
            _ => Err(MissingFields(
                RequiredField::ALL
                    .into_iter()
                    .filter(|field| self.resolve(*field).is_none())
                    .collect(),
            )),
        }
    }
}

/// Empty strings, zero, `false` and `null` count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn year_of(value: &Value) -> Year {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(year) => Year::Integer(year),
            None => Year::Float(n.as_f64().unwrap_or_default()),
        },
        other => Year::Text(text_of(other)),
    }
}

#[derive(Debug, Error)]
pub enum PayloadRejection {
    #[error("Malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed form body: {0}")]
    Form(String),
    #[error("Unreadable request body: {detail}")]
    Body { status: StatusCode, detail: String },
}

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Rejected request body");

        let status = match &self {
            PayloadRejection::Body { status, .. } => *status,
            _ => StatusCode::BAD_REQUEST,
        };

        Envelope::error(
            status,
            "Invalid request body",
            "The request body could not be parsed",
        )
        .into_response()
    }
}

impl<S> FromRequest<S> for BookPayload
where
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| PayloadRejection::Body { status: e.status(), detail: e.body_text() })?;
            if body.is_empty() {
                return Ok(Self::default());
            }

            Ok(Self::from_json(serde_json::from_slice(&body)?))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| match e {
                    FormRejection::BytesRejection(e) => PayloadRejection::Body { status: e.status(), detail: e.body_text() },
                    e => PayloadRejection::Form(e.body_text()),
                })?;

            Ok(Self::from_form(pairs))
        } else {
            Ok(Self::default())
        }
    }
}
