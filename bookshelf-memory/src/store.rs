//! In-memory storage implementation for document stores.
//!
//! Documents are kept as BSON values in insertion-ordered maps guarded by an async-safe
//! read-write lock.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use indexmap::IndexMap;
use mea::rwlock::RwLock;
use bson::Bson;
use uuid::Uuid;

use bookshelf_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    backend::{StoreBackend, StoreBackendBuilder},
};

type CollectionMap = IndexMap<String, Bson>;
type StoreMap = HashMap<String, CollectionMap>;


/// Thread-safe in-memory document storage backend.
///
/// Identifiers are random UUIDs in their 32 character simple form. Listing a collection
/// returns documents in insertion order.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data.
///
/// # Example
///
/// ```ignore
/// use bookshelf_memory::InMemoryStore;
/// use bookshelf_core::backend::StoreBackend;
/// use bson::{Bson, doc};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     let id = store.add_document(Bson::Document(doc! { "title": "Dune" }), "books").await?;
///     assert!(store.get_document(&id, "books").await?.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection_name -> (document_id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<(String, Bson)>> {
        let store = self.store.read().await;

        Ok(
            store
                .get(collection)
                .map(|collection_map| {
                    collection_map
                        .iter()
                        .map(|(id, doc)| (id.clone(), doc.clone()))
                        .collect()
                })
                .unwrap_or_default()
        )
    }

    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Option<Bson>> {
        let store = self.store.read().await;

        Ok(
            store
                .get(collection)
                .and_then(|collection_map| collection_map.get(id))
                .cloned()
        )
    }

    async fn add_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<String> {
        if document.as_document().is_none() {
            return Err(DocumentStoreError::InvalidDocument("Expected document".into()));
        }

        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let mut id = Self::generate_id();
        while collection_map.contains_key(&id) {
            id = Self::generate_id();
        }

        collection_map.insert(id.clone(), document);

        Ok(id)
    }

    async fn update_document(&self, id: &str, fields: Bson, collection: &str) -> DocumentStoreResult<()> {
        let fields = match fields {
            Bson::Document(fields) => fields,
            _ => return Err(DocumentStoreError::InvalidDocument("Expected document".into())),
        };

        let mut store = self.store.write().await;
        let stored = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.get_mut(id))
            .and_then(Bson::as_document_mut)
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string()))?;

        // Merge only the supplied fields
        for (key, value) in fields {
            stored.insert(key, value);
        }

        Ok(())
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        if let Some(collection_map) = store.get_mut(collection) {
            collection_map.shift_remove(id);
        }

        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`].
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_core::{document::Document, store::DocumentStore};
    use bson::doc;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Shelf {
        label: String,
        capacity: i64,
    }

    impl Document for Shelf {
        fn collection_name() -> &'static str {
            "shelves"
        }
    }

    #[derive(Serialize)]
    struct LabelPatch<'a> {
        label: &'a str,
    }

    #[tokio::test]
    async fn test_add_assigns_unique_ids() {
        let store = InMemoryStore::new();

        let first = store
            .add_document(Bson::Document(doc! { "label": "a" }), "shelves")
            .await
            .unwrap();
        let second = store
            .add_document(Bson::Document(doc! { "label": "b" }), "shelves")
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), 32);
    }

    #[tokio::test]
    async fn test_add_rejects_non_documents() {
        let store = InMemoryStore::new();

        let result = store.add_document(Bson::String("loose".into()), "shelves").await;

        assert!(matches!(result, Err(DocumentStoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for label in ["a", "b", "c"] {
            ids.push(
                store
                    .add_document(Bson::Document(doc! { "label": label }), "shelves")
                    .await
                    .unwrap(),
            );
        }

        let listed: Vec<String> = store
            .list_documents("shelves")
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_missing_collection_reads_as_empty() {
        let store = InMemoryStore::new();

        assert!(store.list_documents("nothing").await.unwrap().is_empty());
        assert_eq!(store.get_document("abc", "nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryStore::new();
        let id = store
            .add_document(Bson::Document(doc! { "label": "a", "capacity": 10_i64 }), "shelves")
            .await
            .unwrap();

        store
            .update_document(&id, Bson::Document(doc! { "label": "renamed" }), "shelves")
            .await
            .unwrap();

        let stored = store.get_document(&id, "shelves").await.unwrap().unwrap();
        assert_eq!(stored, Bson::Document(doc! { "label": "renamed", "capacity": 10_i64 }));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = InMemoryStore::new();

        let result = store
            .update_document("missing", Bson::Document(doc! { "label": "x" }), "shelves")
            .await;

        assert!(matches!(result, Err(DocumentStoreError::DocumentNotFound(id, _)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryStore::new();
        let id = store
            .add_document(Bson::Document(doc! { "label": "a" }), "shelves")
            .await
            .unwrap();

        store.delete_document(&id, "shelves").await.unwrap();
        store.delete_document(&id, "shelves").await.unwrap();
        store.delete_document("never-existed", "other").await.unwrap();

        assert_eq!(store.get_document(&id, "shelves").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_typed_collection_round_trip() {
        let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
        let shelves = store.typed_collection::<Shelf>();
        let shelf = Shelf { label: "fiction".into(), capacity: 40 };

        let id = shelves.add(&shelf).await.unwrap();
        shelves.update(&id, &LabelPatch { label: "sci-fi" }).await.unwrap();

        assert_eq!(
            shelves.get(&id).await.unwrap(),
            Some(Shelf { label: "sci-fi".into(), capacity: 40 })
        );
        assert_eq!(shelves.list().await.unwrap().len(), 1);

        shelves.delete(&id).await.unwrap();
        assert_eq!(shelves.get(&id).await.unwrap(), None);
        store.shutdown().await.unwrap();
    }
}
