//! Main fundb crate providing the document query and mutation engine.
//!
//! This crate is the primary entry point for serverless backend functions reading and writing
//! documents. It re-exports the core types from `fundb-core` and gives convenient access to
//! the storage backends.
//!
//! # Features
//!
//! - **Table-scoped identifiers** - Opaque ids that carry the table they belong to
//! - **Strict value validation** - Unsupported values are rejected with the path to the culprit
//! - **Fluent queries** - Index ranges, filter expressions, ordering and cursor pagination
//! - **Mutations** - Insert, patch, replace and delete with system field protection
//!
//! # Quick Start
//!
//! ```ignore
//! use fundb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> DatabaseResult<()> {
//!     let writer = Writer::new(InMemoryStore::new());
//!
//!     let id = writer
//!         .insert("users", doc! { "name": "Alice", "age": 31 })
//!         .await?;
//!
//!     writer.patch(&id, doc! { "age": 32 }).await?;
//!
//!     let adults = writer
//!         .query("users")
//!         .filter(Filter::gte("age", 18))
//!         .order(SortOrder::Desc)
//!         .collect()
//!         .await?;
//!
//!     println!("Adults: {adults:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Pagination
//!
//! Pages are requested with a size and the cursor returned by the previous page. An empty
//! cursor starts from the beginning.
//!
//! ```ignore
//! use fundb::{prelude::*, memory::InMemoryStore};
//!
//! let reader = Reader::new(store);
//! let mut cursor = String::new();
//!
//! loop {
//!     let page = reader
//!         .query("messages")
//!         .paginate(PaginationOptions::new(50).with_cursor(cursor))
//!         .await?;
//!
//!     handle(page.page);
//!
//!     if page.is_done {
//!         break;
//!     }
//!     cursor = page.continue_cursor;
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing

pub mod prelude;

pub use fundb_core::{
    backend, document, error, evaluator, execution, id, page, query, reader, validate, value,
    writer,
};

/// Re-export of the BSON crate used for input documents.
pub use bson;

/// In-memory storage backend.
pub mod memory {
    pub use fundb_memory::{InMemoryStore, InMemoryStoreBuilder};
}
