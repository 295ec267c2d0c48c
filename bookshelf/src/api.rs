//! JSON API handlers. Every response, success or failure, is an [`Envelope`].

use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    validation::BookPayload,
    workflow::{self, Action, Outcome, OutcomeRenderer, ReadFailure},
};

/// The response body shared by every API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

impl Envelope {
    pub fn success(status: StatusCode, data: Value, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data: Some(data),
            error: None,
            message: message.into(),
        }
    }

    pub fn error(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data: None,
            error: Some(error.into()),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn invalid_id() -> Self {
        Self::error(StatusCode::BAD_REQUEST, "Invalid book ID", "A valid book ID is required")
    }

    fn book_not_found() -> Self {
        Self::error(
            StatusCode::NOT_FOUND,
            "Book not found",
            "Book with the specified ID does not exist",
        )
    }

    fn internal(message: &str) -> Self {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", message)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Maps a write outcome to the envelope a JSON client receives.
pub fn envelope_for(action: Action, outcome: Outcome) -> Envelope {
    match outcome {
        Outcome::Completed { id, .. } => match action {
            Action::Create => Envelope::success(StatusCode::CREATED, json!({ "book_id": id }), "Book saved successfully"),
            Action::Update => Envelope::success(StatusCode::OK, json!({ "bookId": id }), "Book updated successfully"),
            Action::Delete => Envelope::success(StatusCode::OK, json!({ "bookId": id }), "Book deleted successfully"),
        },
        Outcome::InvalidId => Envelope::invalid_id(),
        Outcome::Rejected { missing, .. } => {
            Envelope::error(StatusCode::BAD_REQUEST, "Missing required fields", missing.to_string())
        }
        Outcome::NotFound => Envelope::book_not_found(),
        Outcome::Failed => {
            let (error, message) = match action {
                Action::Create => ("Failed to save book", "An error occurred while saving the book"),
                Action::Update => ("Failed to update book", "An error occurred while updating the book"),
                Action::Delete => ("Failed to delete book", "An error occurred while deleting the book"),
            };
            Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, error, message)
        }
        Outcome::Unavailable => Envelope::internal(match action {
            Action::Create => "Failed to save book",
            Action::Update => "Failed to update book",
            Action::Delete => "Failed to delete book",
        }),
    }
}

/// Renders outcomes as JSON envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiRenderer;

#[async_trait]
impl OutcomeRenderer for ApiRenderer {
    async fn render(&self, action: Action, outcome: Outcome) -> Response {
        envelope_for(action, outcome).into_response()
    }
}

pub async fn list_books(State(state): State<AppState>) -> Response {
    let books = workflow::list_books(&state.repository).await;
    let total = books.len();
    let envelope = Envelope::success(
        StatusCode::OK,
        json!({ "books": books, "total": total }),
        "Books fetched successfully",
    );

    ([(header::CACHE_CONTROL, "no-cache")], envelope).into_response()
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<String>) -> Envelope {
    match workflow::fetch_book(&state.repository, &id).await {
        Ok(book) => Envelope::success(
            StatusCode::OK,
            json!({ "bookId": id, "book": book }),
            "Book fetched successfully",
        ),
        Err(ReadFailure::InvalidId) => Envelope::invalid_id(),
        Err(ReadFailure::Missing) => Envelope::book_not_found(),
    }
}

pub async fn save_book(State(state): State<AppState>, payload: BookPayload) -> Response {
    let outcome = workflow::create_book(&state.repository, &payload).await;

    ApiRenderer.render(Action::Create, outcome).await
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: BookPayload,
) -> Response {
    let outcome = workflow::update_book(&state.repository, &id, &payload).await;

    ApiRenderer.render(Action::Update, outcome).await
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let outcome = workflow::delete_book(&state.repository, &id).await;

    ApiRenderer.render(Action::Delete, outcome).await
}

/// Fallback for unknown paths under `/api/`.
pub fn endpoint_not_found() -> Envelope {
    Envelope::error(
        StatusCode::NOT_FOUND,
        "API endpoint not found",
        "The requested API endpoint does not exist",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_envelope_omits_absent_fields() {
        let envelope = Envelope::error(StatusCode::NOT_FOUND, "Book not found", "gone");

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "status": 404, "error": "Book not found", "message": "gone" })
        );
    }

    #[test]
    fn test_created_envelope() {
        let envelope = envelope_for(Action::Create, Outcome::Completed { id: "abc".into(), title: "Dune".into() });

        assert_eq!(envelope.status_code(), StatusCode::CREATED);
        assert_eq!(envelope.data, Some(json!({ "book_id": "abc" })));
        assert_eq!(envelope.message, "Book saved successfully");
    }

    #[test]
    fn test_rejected_envelope_joins_messages() {
        let missing = BookPayload::default().validate().unwrap_err();

        let envelope = envelope_for(Action::Update, Outcome::Rejected { id: Some("abc".into()), missing });

        assert_eq!(
            envelope,
            Envelope::error(
                StatusCode::BAD_REQUEST,
                "Missing required fields",
                "Title is required, Author name is required, Year is required",
            )
        );
    }

    #[test]
    fn test_failures_per_action() {
        assert_eq!(
            envelope_for(Action::Delete, Outcome::Failed).error.as_deref(),
            Some("Failed to delete book")
        );
        assert_eq!(
            envelope_for(Action::Update, Outcome::Unavailable),
            Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", "Failed to update book")
        );
        assert_eq!(envelope_for(Action::Update, Outcome::NotFound).status, 404);
    }
}
