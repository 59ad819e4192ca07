//! In-memory document storage backend for fundb.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses an async-aware read-write lock for concurrent access and is meant for development,
//! tests and local emulation of the hosted database.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and serialized writes using an async-aware RwLock
//! - **Full query support** - Index ranges, filters, ordering by creation time and limits
//! - **Stable cursors** - Pagination cursors keep resolving after their document is deleted
//!
//! # Quick Start
//!
//! ```ignore
//! use fundb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let writer = Writer::new(InMemoryStore::builder().build().await?);
//!
//!     let id = writer.insert("users", doc! { "name": "Alice" }).await?;
//!     let alice = writer.get(&id).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as fundb_memory;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
