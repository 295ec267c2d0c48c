//! MongoDB backend implementation for bookshelf.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//!
//! To use this backend from the service, enable the `mongodb` feature of the `bookshelf`
//! crate and start it with `--store mongodb`.
//!
//! # Connection
//!
//! The backend is built from a MongoDB connection string, which carries the credentials,
//! and a database name. The driver connects lazily, so building succeeds as long as the
//! connection string parses.
//!
//! # Example
//!
//! ```ignore
//! use bookshelf_core::backend::StoreBackendBuilder;
//! use bookshelf_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "bookshelf")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as bookshelf_mongodb;

pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
