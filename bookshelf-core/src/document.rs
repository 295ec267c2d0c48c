//! Core traits for document representation and serialization.
//!
//! This module provides the trait that all stored documents must implement, as well as
//! helpers for converting documents to and from BSON.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Core trait that all documents stored in a document store must implement.
///
/// Identifiers are assigned by the backend and are not part of the stored body, so a
/// document only has to name the collection it lives in.
///
/// # Example
///
/// ```ignore
/// use bookshelf_core::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Note {
///     pub body: String,
/// }
///
/// impl Document for Note {
///     fn collection_name() -> &'static str {
///         "notes"
///     }
/// }
/// ```
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this document belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "books").
    fn collection_name() -> &'static str;
}

/// Extension trait providing BSON conversions for documents.
///
/// This trait is automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }
}

/// Serializes a set of fields for a partial update.
///
/// The value must serialize to a BSON document; fields skipped during serialization are
/// left untouched by the update.
pub fn fields_to_bson<F: Serialize + ?Sized>(fields: &F) -> DocumentStoreResult<Bson> {
    match serialize_to_bson(fields)? {
        document @ Bson::Document(_) => Ok(document),
        other => Err(DocumentStoreError::InvalidDocument(format!(
            "expected a document of fields, got {:?}",
            other.element_type()
        ))),
    }
}
