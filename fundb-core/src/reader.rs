//! Read access to documents.
//!
//! # Example
//!
//! ```ignore
//! use fundb::{prelude::*, memory::InMemoryStore};
//!
//! let reader = Reader::new(InMemoryStore::new());
//!
//! let user = reader.get(&id).await?;
//! let active = reader
//!     .query("users")
//!     .filter(Filter::eq("active", true))
//!     .collect()
//!     .await?;
//! ```

use async_trait::async_trait;

use crate::{
    backend::StoreBackend,
    document::Document,
    error::DatabaseResult,
    execution::{QueryExecution, QueryFetcher},
    id::{DocumentId, IdPolicy, normalize_id},
    query::QueryOptions,
};

/// Read-only view of a document database bound to a storage backend.
#[derive(Debug)]
pub struct Reader<B: StoreBackend> {
    backend: B,
    id_policy: IdPolicy,
}

impl<B: StoreBackend> Reader<B> {
    /// Creates a reader over `backend` with the permissive identifier policy.
    pub fn new(backend: B) -> Self {
        Self { backend, id_policy: IdPolicy::default() }
    }

    /// Sets how [`Reader::normalize_id`] treats the embedded table prefix.
    pub fn with_id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the identifier policy in effect.
    pub fn id_policy(&self) -> IdPolicy {
        self.id_policy
    }

    /// Fetches a document by identifier.
    ///
    /// A missing document yields `Ok(None)`, never an error.
    pub async fn get(&self, id: &DocumentId) -> DatabaseResult<Option<Document>> {
        self.backend.get_document(id).await
    }

    /// Starts a new query over `table`.
    pub fn query(&self, table: &str) -> QueryExecution<'_> {
        QueryExecution::new(table, self)
    }

    /// Returns `raw` as an identifier if it has a valid format, otherwise `None`.
    ///
    /// Under the default [`IdPolicy::Permissive`] an identifier belonging to another table is
    /// accepted.
    pub fn normalize_id(&self, table: &str, raw: &str) -> Option<DocumentId> {
        normalize_id(table, raw, self.id_policy)
    }
}

#[async_trait]
impl<B: StoreBackend> QueryFetcher for Reader<B> {
    async fn fetch(&self, table: &str, options: QueryOptions) -> DatabaseResult<Vec<Document>> {
        self.backend.query_documents(table, options).await
    }
}
