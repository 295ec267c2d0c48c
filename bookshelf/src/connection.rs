//! Lazily established store connection shared by every request.
//!
//! The first caller of [`StoreConnection::get`] builds the backend; concurrent callers wait
//! for that attempt and then share its result. A failed attempt is not remembered, so the
//! next request tries again.

use std::sync::Arc;

use bookshelf_core::{
    backend::StoreBackendBuilder,
    error::DocumentStoreError,
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
};
use bookshelf_memory::InMemoryStore;
use mea::rwlock::RwLock;
use thiserror::Error;

/// Which backend to connect to, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Memory,
    MongoDb { uri: String, database: String },
}

impl StoreSettings {
    /// Human readable name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreSettings::Memory => "memory",
            StoreSettings::MongoDb { .. } => "mongodb",
        }
    }

    async fn connect(&self) -> Result<DynDocumentStore, ConnectionError> {
        match self {
            StoreSettings::Memory => Ok(DocumentStore::new(
                InMemoryStore::builder()
                    .build()
                    .await
                    .map_err(ConnectionError::Connect)?,
            )
            .into_dyn()),
            StoreSettings::MongoDb { uri, database } => connect_mongodb(uri, database).await,
        }
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(uri: &str, database: &str) -> Result<DynDocumentStore, ConnectionError> {
    use bookshelf_mongodb::MongoDbStore;

    let backend = MongoDbStore::builder(uri, database)
        .build()
        .await
        .map_err(ConnectionError::Connect)?;

    Ok(DocumentStore::new(backend).into_dyn())
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_uri: &str, _database: &str) -> Result<DynDocumentStore, ConnectionError> {
    Err(ConnectionError::Unsupported("mongodb"))
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to the document store: {0}")]
    Connect(DocumentStoreError),
    #[error("Failed to close the document store: {0}")]
    Close(DocumentStoreError),
    #[error("Store backend '{0}' is not compiled into this build")]
    Unsupported(&'static str),
    #[error("No store settings configured and no store established")]
    Closed,
}

/// Memoized handle to the document store.
#[derive(Debug)]
pub struct StoreConnection {
    settings: Option<StoreSettings>,
    store: RwLock<Option<Arc<DynDocumentStore>>>,
}

impl StoreConnection {
    /// Creates a connection that is established on first use.
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings: Some(settings),
            store: RwLock::new(None),
        }
    }

    /// Wraps an already built store. Once closed it cannot be re-established.
    pub fn established(store: DynDocumentStore) -> Self {
        Self {
            settings: None,
            store: RwLock::new(Some(Arc::new(store))),
        }
    }

    /// Returns the shared store, establishing it if needed.
    pub async fn get(&self) -> Result<Arc<DynDocumentStore>, ConnectionError> {
        if let Some(store) = self.store.read().await.as_ref() {
            return Ok(Arc::clone(store));
        }

        let mut slot = self.store.write().await;
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let settings = self.settings.as_ref().ok_or(ConnectionError::Closed)?;
        let store = match settings.connect().await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!(store = settings.kind(), error = %e, "Failed to connect to the document store");
                return Err(e);
            }
        };

        tracing::info!(store = settings.kind(), "Connected to the document store");
        *slot = Some(Arc::clone(&store));

        Ok(store)
    }

    pub async fn is_connected(&self) -> bool {
        self.store.read().await.is_some()
    }

    /// Releases the store if one was established. Safe to call repeatedly.
    pub async fn close(&self) -> Result<(), ConnectionError> {
        let Some(store) = self.store.write().await.take() else {
            return Ok(());
        };

        match Arc::try_unwrap(store) {
            Ok(store) => store.shutdown().await.map_err(ConnectionError::Close)?,
            Err(_) => {
                tracing::warn!("Document store still in use, dropping without shutdown");
                return Ok(());
            }
        }

        tracing::info!("Document store connection closed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_memoizes_the_store() {
        let connection = StoreConnection::new(StoreSettings::Memory);
        assert!(!connection.is_connected().await);

        let first = connection.get().await.unwrap();
        let second = connection.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(connection.is_connected().await);
    }

    #[tokio::test]
    async fn test_concurrent_first_use_shares_one_store() {
        let connection = Arc::new(StoreConnection::new(StoreSettings::Memory));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let connection = Arc::clone(&connection);
                tokio::spawn(async move { connection.get().await.unwrap() })
            })
            .collect();

        let mut stores = Vec::new();
        for handle in handles {
            stores.push(handle.await.unwrap());
        }

        assert!(stores.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }

    #[tokio::test]
    async fn test_close_allows_reconnect() {
        let connection = StoreConnection::new(StoreSettings::Memory);
        let first = connection.get().await.unwrap();
        drop(first);

        connection.close().await.unwrap();
        assert!(!connection.is_connected().await);
        connection.close().await.unwrap();

        connection.get().await.unwrap();
        assert!(connection.is_connected().await);
    }

    #[tokio::test]
    async fn test_closed_established_store_cannot_reconnect() {
        let store = DocumentStore::new(InMemoryStore::new()).into_dyn();
        let connection = StoreConnection::established(store);

        connection.close().await.unwrap();

        assert!(matches!(connection.get().await, Err(ConnectionError::Closed)));
    }

    #[cfg(not(feature = "mongodb"))]
    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        let connection = StoreConnection::new(StoreSettings::MongoDb {
            uri: "mongodb://localhost:27017".into(),
            database: "bookshelf".into(),
        });

        assert!(matches!(connection.get().await, Err(ConnectionError::Unsupported("mongodb"))));
        assert!(!connection.is_connected().await);
        assert!(matches!(connection.get().await, Err(ConnectionError::Unsupported("mongodb"))));
    }
}
