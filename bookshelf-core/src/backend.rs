//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over different storage implementations,
//! allowing the document store to work with an in-memory map or a remote database alike.
//!
//! # Overview
//!
//! The [`StoreBackend`] trait provides a unified async interface for the five single-document
//! operations a keyed collection supports: list, get, add, update and delete. Identifiers are
//! opaque strings chosen by the backend when a document is added.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: A trait for dynamic dispatch over backend implementations
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use bookshelf_core::backend::StoreBackend;
//! use bson::{Bson, doc};
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = backend
//!     .add_document(Bson::Document(doc! { "title": "Dune" }), "books")
//!     .await?;
//! let stored = backend.get_document(&id, "books").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Bson;
use std::fmt::Debug;

use crate::error::DocumentStoreResult;

/// Abstract interface for document storage backends.
///
/// Collections are flat keyed blob stores: there are no secondary indexes, projections or
/// partial reads. Documents are exchanged as BSON documents without their identifier; the
/// identifier travels next to the document.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks.
///
/// # Error Handling
///
/// Operations return [`DocumentStoreResult<T>`](crate::error::DocumentStoreResult). Backends
/// do not classify transport failures; anything that is not a missing document surfaces as
/// [`DocumentStoreError::Backend`](crate::error::DocumentStoreError::Backend).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Lists every document of a collection together with its identifier.
    ///
    /// The order is defined by the backend and is not guaranteed to be stable.
    /// A collection that does not exist yields an empty list.
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<(String, Bson)>>;

    /// Retrieves a single document by identifier.
    ///
    /// Returns `Ok(None)` when no document matches, including identifiers the backend
    /// could never have issued.
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Option<Bson>>;

    /// Adds a new document and returns the identifier assigned to it.
    ///
    /// # Arguments
    ///
    /// * `document` - A BSON document; any other BSON value is rejected
    /// * `collection` - The name of the collection. Created automatically if it doesn't exist.
    async fn add_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<String>;

    /// Merges the given fields into an existing document.
    ///
    /// Fields not present in `fields` keep their stored value. Updating a document that does
    /// not exist fails with [`DocumentStoreError::DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound).
    async fn update_document(
        &self,
        id: &str,
        fields: Bson,
        collection: &str,
    ) -> DocumentStoreResult<()>;

    /// Deletes a document by identifier.
    ///
    /// Deleting a document that does not exist succeeds.
    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op, but backends with external connections
    /// should override this.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Object-safe mirror of [`StoreBackend`], implemented for every backend.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<(String, Bson)>>;
    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Option<Bson>>;
    async fn add_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<String>;
    async fn update_document(
        &self,
        id: &str,
        fields: Bson,
        collection: &str,
    ) -> DocumentStoreResult<()>;
    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()>;
    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()>;
}

#[async_trait]
impl<B: StoreBackend + Send + Sync + 'static> DynStoreBackend for B {
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<(String, Bson)>> {
        StoreBackend::list_documents(self, collection).await
    }

    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Option<Bson>> {
        StoreBackend::get_document(self, id, collection).await
    }

    async fn add_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<String> {
        StoreBackend::add_document(self, document, collection).await
    }

    async fn update_document(
        &self,
        id: &str,
        fields: Bson,
        collection: &str,
    ) -> DocumentStoreResult<()> {
        StoreBackend::update_document(self, id, fields, collection).await
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        StoreBackend::delete_document(self, id, collection).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()> {
        StoreBackend::shutdown(*self).await
    }
}

/// Factory for backends whose construction is itself fallible and async
/// (parsing a connection string, opening a client).
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
