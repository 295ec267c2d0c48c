//! The request workflow shared by the HTML and JSON surfaces.
//!
//! Each mutating request runs through the same steps (id check, validation, existence
//! check, one store write) and ends in an [`Outcome`]. A surface only decides how an
//! outcome is presented, by implementing [`OutcomeRenderer`].

use async_trait::async_trait;
use axum::response::Response;

use crate::{
    model::{Book, BookPatch},
    repository::{BookRepository, RepositoryError},
    validation::{BookPayload, MissingFields},
};

/// The write a request asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The write went through. `title` is the title the book carried at the time.
    Completed { id: String, title: String },
    InvalidId,
    Rejected { id: Option<String>, missing: MissingFields },
    NotFound,
    /// The store refused the write.
    Failed,
    /// The store could not be reached at all.
    Unavailable,
}

/// Why a book could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailure {
    InvalidId,
    Missing,
}

/// Presents the outcome of a write to the client.
#[async_trait]
pub trait OutcomeRenderer: Send + Sync {
    async fn render(&self, action: Action, outcome: Outcome) -> Response;
}

fn checked_id(id: &str) -> Option<&str> {
    let trimmed = id.trim();
    (!trimmed.is_empty()).then_some(id)
}

/// Looks a book up ahead of a write. Any failure reads as absence.
async fn existing(repository: &BookRepository, id: &str) -> Result<Book, Outcome> {
    repository.get_by_id(id).await.map_err(|_| Outcome::NotFound)
}

fn write_failure(error: RepositoryError) -> Outcome {
    match error {
        RepositoryError::NotFound(_) => Outcome::NotFound,
        RepositoryError::Store(_) => Outcome::Failed,
        RepositoryError::Connection(_) => Outcome::Unavailable,
    }
}

pub async fn create_book(repository: &BookRepository, payload: &BookPayload) -> Outcome {
    let fields = match payload.validate() {
        Ok(fields) => fields,
        Err(missing) => {
            tracing::debug!(%missing, "Rejected new book");
            return Outcome::Rejected { id: None, missing };
        }
    };

    match repository.create(&fields).await {
        Ok(id) => Outcome::Completed { id, title: fields.title },
        Err(e) => write_failure(e),
    }
}

pub async fn update_book(repository: &BookRepository, id: &str, payload: &BookPayload) -> Outcome {
    let Some(id) = checked_id(id) else {
        return Outcome::InvalidId;
    };

    let fields = match payload.validate() {
        Ok(fields) => fields,
        Err(missing) => {
            tracing::debug!(id, %missing, "Rejected book update");
            return Outcome::Rejected { id: Some(id.to_string()), missing };
        }
    };

    if let Err(outcome) = existing(repository, id).await {
        return outcome;
    }

    let title = fields.title.clone();
    match repository.update(id, &BookPatch::from(fields)).await {
        Ok(()) => Outcome::Completed { id: id.to_string(), title },
        Err(e) => write_failure(e),
    }
}

pub async fn delete_book(repository: &BookRepository, id: &str) -> Outcome {
    let Some(id) = checked_id(id) else {
        return Outcome::InvalidId;
    };

    let book = match existing(repository, id).await {
        Ok(book) => book,
        Err(outcome) => return outcome,
    };

    match repository.delete_by_id(id).await {
        Ok(()) => Outcome::Completed { id: id.to_string(), title: book.title },
        Err(e) => write_failure(e),
    }
}

/// Reads one book. Store and connection errors read like a missing book.
pub async fn fetch_book(repository: &BookRepository, id: &str) -> Result<Book, ReadFailure> {
    let id = checked_id(id).ok_or(ReadFailure::InvalidId)?;

    repository.get_by_id(id).await.map_err(|_| ReadFailure::Missing)
}

/// Reads every book. Any failure reads as an empty catalog.
pub async fn list_books(repository: &BookRepository) -> Vec<Book> {
    repository.list_all().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Listing books failed, serving an empty list");
        Vec::new()
    })
}
