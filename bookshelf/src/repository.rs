//! Data access for the `books` collection.

use std::sync::Arc;

use bookshelf_core::error::DocumentStoreError;
use thiserror::Error;

use crate::{
    connection::{ConnectionError, StoreConnection},
    model::{Book, BookFields, BookPatch},
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Book not found: {0}")]
    NotFound(String),
    #[error("Store error: {0}")]
    Store(#[from] DocumentStoreError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Book storage operations over the shared store connection.
#[derive(Debug, Clone)]
pub struct BookRepository {
    connection: Arc<StoreConnection>,
}

impl BookRepository {
    pub fn new(connection: Arc<StoreConnection>) -> Self {
        Self { connection }
    }

    /// All books in store order, each carrying its identifier.
    pub async fn list_all(&self) -> RepositoryResult<Vec<Book>> {
        let store = self.connection.get().await?;

        let books = store
            .typed_collection::<Book>()
            .list()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error listing books"))?;

        Ok(books.into_iter().map(|(id, book)| book.with_id(id)).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> RepositoryResult<Book> {
        let store = self.connection.get().await?;

        store
            .typed_collection::<Book>()
            .get(id)
            .await
            .inspect_err(|e| tracing::error!(id, error = %e, "Error fetching book"))?
            .map(|book| book.with_id(id))
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Stores a new book and returns the identifier assigned to it.
    pub async fn create(&self, fields: &BookFields) -> RepositoryResult<String> {
        let store = self.connection.get().await?;
        let book = Book::from(fields.clone());

        let id = store
            .typed_collection::<Book>()
            .add(&book)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error creating book"))?;

        tracing::debug!(id = %id, title = %book.title, "Book created");

        Ok(id)
    }

    /// Merges the supplied fields into an existing book.
    pub async fn update(&self, id: &str, patch: &BookPatch) -> RepositoryResult<()> {
        let store = self.connection.get().await?;

        match store.typed_collection::<Book>().update(id, patch).await {
            Ok(()) => Ok(()),
            Err(DocumentStoreError::DocumentNotFound(..)) => Err(RepositoryError::NotFound(id.to_string())),
            Err(e) => {
                tracing::error!(id, error = %e, "Error updating book");
                Err(e.into())
            }
        }
    }

    /// Removes a book. Deleting an unknown identifier succeeds.
    pub async fn delete_by_id(&self, id: &str) -> RepositoryResult<()> {
        let store = self.connection.get().await?;

        store
            .typed_collection::<Book>()
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!(id, error = %e, "Error deleting book"))?;

        Ok(())
    }
}
