//! Collection types for document store operations.
//!
//! A collection handle binds a collection name to a backend and converts between typed
//! documents and the BSON the backend stores.
//!
//! # Collection Types
//!
//! - [`TypedCollection`] - Type-safe collection over a statically known backend
//! - [`DynTypedCollection`] - The same API over a dynamically dispatched backend
//!
//! # Example
//!
//! ```ignore
//! use bookshelf_core::document::Document;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Note {
//!     pub body: String,
//! }
//!
//! impl Document for Note {
//!     fn collection_name() -> &'static str { "notes" }
//! }
//!
//! # async fn example(store: &bookshelf_core::store::DocumentStore<impl bookshelf_core::backend::StoreBackend>) -> bookshelf_core::error::DocumentStoreResult<()> {
//! let notes = store.typed_collection::<Note>();
//! let id = notes.add(&Note { body: "hello".to_string() }).await?;
//! let note = notes.get(&id).await?;
//! # Ok(()) }
//! ```

use bson::Bson;
use serde::Serialize;
use std::marker::PhantomData;

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    document::{Document, DocumentExt, fields_to_bson},
    error::DocumentStoreResult,
};

fn decode_all<D: Document>(documents: Vec<(String, Bson)>) -> DocumentStoreResult<Vec<(String, D)>> {
    documents
        .into_iter()
        .map(|(id, bson)| D::from_bson(bson).map(|doc| (id, doc)))
        .collect()
}

/// A typed collection with a reference to a statically known backend.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the backend reference
/// * `B` - The storage backend type
/// * `D` - The document type stored in the collection
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lists every document in the collection together with its identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if retrieval or
    /// deserialization of any document fails.
    pub async fn list(&self) -> DocumentStoreResult<Vec<(String, D)>> {
        decode_all(StoreBackend::list_documents(self.backend, self.name()).await?)
    }

    /// Retrieves a document by identifier, or `None` when it does not exist.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<D>> {
        StoreBackend::get_document(self.backend, id, self.name())
            .await?
            .map(D::from_bson)
            .transpose()
    }

    /// Adds a document and returns the identifier the backend assigned to it.
    pub async fn add(&self, document: &D) -> DocumentStoreResult<String> {
        StoreBackend::add_document(self.backend, document.to_bson()?, self.name()).await
    }

    /// Merges `fields` into the stored document with the given identifier.
    ///
    /// # Errors
    ///
    /// Fails with [`DocumentStoreError::DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
    /// if the document does not exist.
    pub async fn update<F: Serialize + Sync + ?Sized>(
        &self,
        id: &str,
        fields: &F,
    ) -> DocumentStoreResult<()> {
        StoreBackend::update_document(self.backend, id, fields_to_bson(fields)?, self.name()).await
    }

    /// Deletes a document by identifier. Missing documents are not an error.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<()> {
        StoreBackend::delete_document(self.backend, id, self.name()).await
    }
}

/// A typed collection over a backend trait object.
///
/// Mirrors [`TypedCollection`] for stores whose backend is selected at runtime.
#[derive(Debug)]
pub struct DynTypedCollection<'a, D: Document> {
    name: String,
    backend: &'a dyn DynStoreBackend,
    _marker: PhantomData<D>,
}

impl<'a, D: Document> DynTypedCollection<'a, D> {
    pub(crate) fn new(name: String, backend: &'a dyn DynStoreBackend) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lists every document in the collection together with its identifier.
    pub async fn list(&self) -> DocumentStoreResult<Vec<(String, D)>> {
        decode_all(self.backend.list_documents(self.name()).await?)
    }

    /// Retrieves a document by identifier, or `None` when it does not exist.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<D>> {
        self.backend
            .get_document(id, self.name())
            .await?
            .map(D::from_bson)
            .transpose()
    }

    /// Adds a document and returns the identifier the backend assigned to it.
    pub async fn add(&self, document: &D) -> DocumentStoreResult<String> {
        self.backend
            .add_document(document.to_bson()?, self.name())
            .await
    }

    /// Merges `fields` into the stored document with the given identifier.
    pub async fn update<F: Serialize + Sync + ?Sized>(
        &self,
        id: &str,
        fields: &F,
    ) -> DocumentStoreResult<()> {
        self.backend
            .update_document(id, fields_to_bson(fields)?, self.name())
            .await
    }

    /// Deletes a document by identifier. Missing documents are not an error.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<()> {
        self.backend
            .delete_document(id, self.name())
            .await
    }
}
