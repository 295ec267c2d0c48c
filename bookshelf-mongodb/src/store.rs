use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, Bson, doc, oid::ObjectId};
use mongodb::{Client, Collection as MongoCollection, options::ClientOptions};
use bookshelf_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
};


/// MongoDB-backed document store.
///
/// Documents are stored with a server-side `ObjectId` as `_id`; the hex form of that id is
/// the identifier exposed to callers. Identifiers that are not valid ObjectIds cannot match
/// any document.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn prepare_document(document: Bson) -> DocumentStoreResult<Document> {
        match document {
            Bson::Document(mut document) => {
                document.remove("_id");
                Ok(document)
            }
            _ => Err(DocumentStoreError::InvalidDocument("Expected document".into())),
        }
    }

    fn restore_document(mut document: Document) -> DocumentStoreResult<(String, Bson)> {
        let id = match document.remove("_id") {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(id)) => id,
            Some(other) => other.to_string(),
            None => return Err(DocumentStoreError::InvalidDocument("Stored document has no _id".into())),
        };

        Ok((id, Bson::Document(document)))
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Matches the document with the given id. Ids that are not `ObjectId` hex strings match a
/// string `_id`.
pub(crate) fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "_id": id },
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn list_documents(&self, collection: &str) -> DocumentStoreResult<Vec<(String, Bson)>> {
        self.get_collection(collection)
            .find(doc! {})
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .into_iter()
            .map(Self::restore_document)
            .collect()
    }

    async fn get_document(&self, id: &str, collection: &str) -> DocumentStoreResult<Option<Bson>> {
        self.get_collection(collection)
            .find_one(id_filter(id))
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .map(|doc| Self::restore_document(doc).map(|(_, doc)| doc))
            .transpose()
    }

    async fn add_document(&self, document: Bson, collection: &str) -> DocumentStoreResult<String> {
        let inserted = self.get_collection(collection)
            .insert_one(Self::prepare_document(document)?)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        match inserted.inserted_id {
            Bson::ObjectId(oid) => Ok(oid.to_hex()),
            other => Err(DocumentStoreError::Backend(format!("Unexpected inserted id {other}"))),
        }
    }

    async fn update_document(&self, id: &str, fields: Bson, collection: &str) -> DocumentStoreResult<()> {
        let result = self.get_collection(collection)
            .update_one(
                id_filter(id),
                doc! { "$set": Self::prepare_document(fields)? },
            )
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string()));
        }

        Ok(())
    }

    async fn delete_document(&self, id: &str, collection: &str) -> DocumentStoreResult<()> {
        self.get_collection(collection)
            .delete_one(id_filter(id))
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_filter_uses_object_id_for_hex() {
        let oid = ObjectId::new();

        assert_eq!(id_filter(&oid.to_hex()), doc! { "_id": oid });
    }

    #[test]
    fn test_id_filter_falls_back_to_string() {
        assert_eq!(id_filter("legacy-id"), doc! { "_id": "legacy-id" });
        assert_eq!(id_filter(""), doc! { "_id": "" });
    }

    #[test]
    fn test_prepare_document_strips_id() {
        let prepared = MongoDbStore::prepare_document(Bson::Document(
            doc! { "_id": "client-chosen", "title": "Dune" },
        ))
        .unwrap();

        assert_eq!(prepared, doc! { "title": "Dune" });
    }

    #[test]
    fn test_restore_document_exposes_hex_id() {
        let oid = ObjectId::new();

        let (id, body) = MongoDbStore::restore_document(doc! { "_id": oid, "title": "Dune" }).unwrap();

        assert_eq!(id, oid.to_hex());
        assert_eq!(body, Bson::Document(doc! { "title": "Dune" }));
    }

    #[test]
    fn test_restore_document_keeps_string_id_unquoted() {
        let (id, _) = MongoDbStore::restore_document(doc! { "_id": "legacy-id", "title": "Dune" }).unwrap();

        assert_eq!(id, "legacy-id");
        assert_eq!(id_filter(&id), doc! { "_id": "legacy-id" });
    }

    #[tokio::test]
    async fn test_builder_rejects_malformed_dsn() {
        let result = MongoDbStore::builder("not a connection string", "bookshelf")
            .build()
            .await;

        assert!(matches!(result, Err(DocumentStoreError::Initialization(_))));
    }
}
