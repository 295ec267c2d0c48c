//! HTML page templates.
//!
//! Templates are minijinja files kept next to this module and compiled into the binary.
//! Pages extend `layout.html`, which renders the flash messages. Names end in `.html` so
//! minijinja escapes every interpolated value.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

pub const LAYOUT: &str = "layout.html";
pub const INDEX: &str = "index.html";
pub const ADD: &str = "add.html";
pub const BOOK_DETAIL: &str = "book_detail.html";
pub const EDIT: &str = "edit.html";
pub const NOT_FOUND: &str = "not_found.html";

const SOURCES: [(&str, &str); 6] = [
    (LAYOUT, include_str!("templates/layout.html")),
    (INDEX, include_str!("templates/index.html")),
    (ADD, include_str!("templates/add.html")),
    (BOOK_DETAIL, include_str!("templates/book_detail.html")),
    (EDIT, include_str!("templates/edit.html")),
    (NOT_FOUND, include_str!("templates/not_found.html")),
];

#[derive(Debug, Error)]
#[error("Template error: {0}")]
pub struct TemplateError(#[from] minijinja::Error);

impl IntoResponse for TemplateError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Failed to render page");

        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for (name, source) in SOURCES {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<Html<String>, TemplateError> {
        Ok(Html(self.env.get_template(name)?.render(context)?))
    }
}
