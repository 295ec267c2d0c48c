//! In-memory document storage backend for bookshelf.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development,
//! tests and single-process deployments where losing data on restart is acceptable.
//!
//! # Quick Start
//!
//! ```ignore
//! use bookshelf_core::{backend::StoreBackendBuilder, store::DocumentStore};
//! use bookshelf_memory::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
//!     let books = store.typed_collection::<Book>();
//!
//!     let id = books.add(&book).await.unwrap();
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as bookshelf_memory;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
