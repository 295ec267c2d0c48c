//! HTML pages and form handlers.
//!
//! Writes never render a page directly: they leave a flash message in the session and
//! redirect, so the next page shows it.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;

use crate::{
    AppState,
    api::ApiRenderer,
    negotiate::ResponseMode,
    session::Session,
    templates::{self, TemplateError},
    validation::BookPayload,
    workflow::{self, Action, Outcome, OutcomeRenderer, ReadFailure},
};

const BOOKS: &str = "/books";
const ADD_BOOK: &str = "/books/add";

/// The message left for the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashMessage {
    Success(String),
    Error(String),
}

/// Maps a write outcome to the flash message and the page to go to next.
pub fn flash_for(action: Action, outcome: Outcome) -> (FlashMessage, String) {
    use FlashMessage::{Error, Success};

    let books = || BOOKS.to_string();
    match (action, outcome) {
        (Action::Create, Outcome::Completed { title, .. }) => {
            (Success(format!("Book \"{title}\" saved successfully")), books())
        }
        (Action::Update, Outcome::Completed { title, .. }) => {
            (Success(format!("Book \"{title}\" updated successfully")), books())
        }
        (Action::Delete, Outcome::Completed { title, .. }) => {
            (Success(format!("Book \"{title}\" deleted successfully")), books())
        }
        (Action::Create, Outcome::Rejected { missing, .. }) => (Error(missing.to_string()), ADD_BOOK.to_string()),
        (Action::Update, Outcome::Rejected { id: Some(id), missing }) => {
            (Error(missing.to_string()), format!("/books/{}/edit", encode_segment(&id)))
        }
        (Action::Create, _) => (Error("Error saving book".into()), ADD_BOOK.to_string()),
        (_, Outcome::InvalidId) => (Error("Invalid book ID".into()), books()),
        (_, Outcome::NotFound) => (Error("Book not found".into()), books()),
        (Action::Update, _) => (Error("Error updating book".into()), books()),
        (Action::Delete, _) => (Error("Failed to delete book".into()), books()),
    }
}

/// Percent-encodes one path segment.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Renders outcomes as a flash message plus a redirect.
#[derive(Debug, Clone)]
pub struct FlashRedirect {
    session: Session,
}

impl FlashRedirect {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl OutcomeRenderer for FlashRedirect {
    async fn render(&self, action: Action, outcome: Outcome) -> Response {
        let (message, target) = flash_for(action, outcome);
        match message {
            FlashMessage::Success(message) => self.session.flash_success(message).await,
            FlashMessage::Error(message) => self.session.flash_error(message).await,
        }

        Redirect::to(&target).into_response()
    }
}

async fn redirect_with_error(session: &Session, message: &str, target: &str) -> Response {
    session.flash_error(message).await;
    Redirect::to(target).into_response()
}

pub async fn list_books(State(state): State<AppState>, session: Session) -> Result<Response, TemplateError> {
    let flash = session.take_flash().await;
    let books = workflow::list_books(&state.repository).await;

    let page = state
        .templates
        .render(templates::INDEX, context! { title => "Home - Books", books, flash })?;

    Ok(page.into_response())
}

pub async fn add_form(State(state): State<AppState>, session: Session) -> Result<Response, TemplateError> {
    let flash = session.take_flash().await;

    let page = state
        .templates
        .render(templates::ADD, context! { title => "Add Book", flash })?;

    Ok(page.into_response())
}

pub async fn show_book(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, TemplateError> {
    let book = match workflow::fetch_book(&state.repository, &id).await {
        Ok(book) => book,
        Err(ReadFailure::InvalidId | ReadFailure::Missing) => {
            return Ok(redirect_with_error(&session, "Book not found", BOOKS).await);
        }
    };

    let flash = session.take_flash().await;
    let title = format!("{} - Book Details", book.title);
    let page = state
        .templates
        .render(templates::BOOK_DETAIL, context! { title, book, flash })?;

    Ok(page.into_response())
}

pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, TemplateError> {
    let book = match workflow::fetch_book(&state.repository, &id).await {
        Ok(book) => book,
        Err(ReadFailure::InvalidId | ReadFailure::Missing) => {
            return Ok(redirect_with_error(&session, "Book not found", BOOKS).await);
        }
    };

    let flash = session.take_flash().await;
    let page = state
        .templates
        .render(templates::EDIT, context! { title => "Edit Book", book, flash })?;

    Ok(page.into_response())
}

pub async fn save_book(State(state): State<AppState>, session: Session, payload: BookPayload) -> Response {
    let outcome = workflow::create_book(&state.repository, &payload).await;

    FlashRedirect::new(session).render(Action::Create, outcome).await
}

pub async fn update_book(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    payload: BookPayload,
) -> Response {
    let outcome = workflow::update_book(&state.repository, &id, &payload).await;

    FlashRedirect::new(session).render(Action::Update, outcome).await
}

/// Deletes a book. Script clients get the JSON envelope, browsers a redirect.
pub async fn delete_book(
    State(state): State<AppState>,
    session: Session,
    mode: ResponseMode,
    Path(id): Path<String>,
) -> Response {
    let outcome = workflow::delete_book(&state.repository, &id).await;

    match mode {
        ResponseMode::Json => ApiRenderer.render(Action::Delete, outcome).await,
        ResponseMode::Html => FlashRedirect::new(session).render(Action::Delete, outcome).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn completed() -> Outcome {
        Outcome::Completed { id: "abc".into(), title: "Dune".into() }
    }

    #[test]
    fn test_success_messages() {
        assert_eq!(
            flash_for(Action::Create, completed()),
            (FlashMessage::Success("Book \"Dune\" saved successfully".into()), "/books".into())
        );
        assert_eq!(
            flash_for(Action::Update, completed()).0,
            FlashMessage::Success("Book \"Dune\" updated successfully".into())
        );
        assert_eq!(
            flash_for(Action::Delete, completed()).0,
            FlashMessage::Success("Book \"Dune\" deleted successfully".into())
        );
    }

    #[test]
    fn test_rejections_return_to_the_form() {
        let missing = BookPayload::default().validate().unwrap_err();

        assert_eq!(
            flash_for(Action::Create, Outcome::Rejected { id: None, missing: missing.clone() }),
            (
                FlashMessage::Error("Title is required, Author name is required, Year is required".into()),
                "/books/add".into()
            )
        );
        assert_eq!(
            flash_for(Action::Update, Outcome::Rejected { id: Some("a b/c".into()), missing }).1,
            "/books/a%20b%2Fc/edit"
        );
    }

    #[test]
    fn test_failures() {
        let error = |action, outcome| match flash_for(action, outcome) {
            (FlashMessage::Error(message), target) => (message, target),
            other => panic!("expected an error flash, got {other:?}"),
        };

        assert_eq!(error(Action::Create, Outcome::Failed), ("Error saving book".into(), "/books/add".into()));
        assert_eq!(error(Action::Create, Outcome::Unavailable).0, "Error saving book");
        assert_eq!(error(Action::Update, Outcome::InvalidId), ("Invalid book ID".into(), "/books".into()));
        assert_eq!(error(Action::Update, Outcome::NotFound).0, "Book not found");
        assert_eq!(error(Action::Update, Outcome::Unavailable).0, "Error updating book");
        assert_eq!(error(Action::Delete, Outcome::NotFound).0, "Book not found");
        assert_eq!(error(Action::Delete, Outcome::Failed), ("Failed to delete book".into(), "/books".into()));
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("0123abcXYZ-._~"), "0123abcXYZ-._~");
        assert_eq!(encode_segment("é?#"), "%C3%A9%3F%23");
    }
}
