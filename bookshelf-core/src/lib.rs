//! A thin document store abstraction shared by the bookshelf backends.
//!
//! This crate provides:
//!
//! - **Document traits** ([`document`]) - The trait stored types implement and BSON helpers
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Collections interface** ([`collection`]) - Typed access to a single collection
//! - **Document store** ([`store`]) - Owns a backend and hands out collections
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! Identifiers are opaque strings assigned by the backend when a document is added. A
//! collection is a flat keyed set of documents: list, get, add, merge-update and delete
//! are the only operations.
//!
//! # Example
//!
//! ```ignore
//! use bookshelf_core::{document::Document, store::DocumentStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Note {
//!     pub body: String,
//! }
//!
//! impl Document for Note {
//!     fn collection_name() -> &'static str {
//!         "notes"
//!     }
//! }
//!
//! let store = DocumentStore::new(backend);
//! let id = store.typed_collection::<Note>().add(&note).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as bookshelf_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod store;
