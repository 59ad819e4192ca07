//! Convenient re-exports of commonly used types from fundb.
//!
//! ```ignore
//! use fundb::prelude::*;
//! ```
//!
//! This provides access to the reader and writer surfaces, query construction, pagination,
//! identifiers, values, store backends and error types.

pub use fundb_core::{
    backend::{DocumentUpdate, StoreBackend, StoreBackendBuilder},
    document::{CREATION_TIME_FIELD, Document, ID_FIELD},
    error::{DatabaseError, DatabaseResult},
    execution::{QueryExecution, QueryFetcher},
    id::{DocumentId, IdPolicy, OsRandom, RandomSource, SeededRandom},
    page::{PaginationOptions, PaginationResult},
    query::{Expr, FieldOp, Filter, IndexCondition, IndexRange, QueryOptions, QueryVisitor, SortOrder},
    reader::Reader,
    value::{Fields, Value},
    writer::{Writer, WriterBuilder},
};
