//! Document query and mutation engine for serverless backend functions.
//!
//! This crate is the core of the fundb project. It is pure logic over values and a single
//! injected storage boundary, and provides:
//!
//! - **Identifiers** ([`id`]) - Table-scoped random identifiers: creation, parsing, normalization
//! - **Values** ([`value`]) - The closed value system stored in documents
//! - **Validation** ([`validate`]) - Recursive, path-qualified validation of incoming values
//! - **Documents** ([`document`]) - Stored documents and their system fields
//! - **Query building** ([`query`]) - Filter expressions, index ranges and query options
//! - **Evaluation** ([`evaluator`]) - Matching filter expressions against documents
//! - **Execution** ([`execution`]) - The fluent query state machine and its terminal operations
//! - **Pagination** ([`page`]) - Page types and the opaque cursor codec
//! - **Store backend abstraction** ([`backend`]) - The storage contract
//! - **Reader and Writer** ([`reader`], [`writer`]) - The public read and write surfaces
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use fundb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! let writer = Writer::new(InMemoryStore::new());
//! let id = writer.insert("users", doc! { "name": "Ada" }).await?;
//!
//! let ada = writer
//!     .query("users")
//!     .filter(Filter::eq("name", "Ada"))
//!     .unique()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as fundb_core;

pub mod backend;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod execution;
pub mod id;
pub mod page;
pub mod query;
pub mod reader;
pub mod validate;
pub mod value;
pub mod writer;
