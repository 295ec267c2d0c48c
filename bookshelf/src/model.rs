//! The book record and the field sets used to create and update it.

use std::fmt;

use bookshelf_core::document::Document;
use serde::{Deserialize, Serialize};

/// Publication year as supplied by the client.
///
/// Form posts deliver text, JSON clients may send a number; both are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Integer(year) => write!(f, "{year}"),
            Year::Float(year) => write!(f, "{year}"),
            Year::Text(year) => f.write_str(year),
        }
    }
}

/// A book as stored in the `books` collection.
///
/// `id` is never written to the store; it is filled in from the store-assigned key
/// whenever a record is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub author_name: String,
    pub year: Year,
}

impl Book {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Document for Book {
    fn collection_name() -> &'static str {
        "books"
    }
}

/// A complete, validated set of book fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookFields {
    pub title: String,
    pub author_name: String,
    pub year: Year,
}

impl From<BookFields> for Book {
    fn from(fields: BookFields) -> Self {
        Book {
            id: None,
            title: fields.title,
            author_name: fields.author_name,
            year: fields.year,
        }
    }
}

/// A partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
}

impl From<BookFields> for BookPatch {
    fn from(fields: BookFields) -> Self {
        BookPatch {
            title: Some(fields.title),
            author_name: Some(fields.author_name),
            year: Some(fields.year),
        }
    }
}
