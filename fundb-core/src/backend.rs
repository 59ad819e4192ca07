//! Storage backend abstraction.
//!
//! The engine never touches storage directly. Everything it needs from a storage engine is the
//! [`StoreBackend`] contract: document lookup by identifier, table-scoped enumeration with
//! query options, persist, and delete.
//!
//! # Concurrency
//!
//! The engine does not serialize calls. A backend must make the read-modify-write performed by
//! `patch` and `replace` atomic per identifier: another writer's save to the same identifier
//! must not be observably interleaved between the read and the write.
//!
//! # Examples
//!
//! ```ignore
//! use fundb::backend::StoreBackend;
//!
//! let backend = MyBackendImpl::new();
//! let doc = backend.get_document(&id).await?;
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    document::Document,
    error::DatabaseResult,
    id::DocumentId,
    query::QueryOptions,
};

/// Abstract interface for document storage backends.
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Looks up a document by identifier alone.
    ///
    /// Returns `Ok(None)` if no such document exists.
    async fn get_document(&self, id: &DocumentId) -> DatabaseResult<Option<Document>>;

    /// Looks up a document by table and identifier.
    ///
    /// Returns `Ok(None)` if no such document exists in `table`.
    async fn get_document_by_table_and_id(
        &self,
        table: &str,
        id: &DocumentId,
    ) -> DatabaseResult<Option<Document>>;

    /// Enumerates the documents of `table` matching `options`.
    ///
    /// The result must already be restricted by the index selection, index range conditions
    /// and filters, ordered by `_creationTime` according to `options.order`, resumed after
    /// `options.cursor` when present, and truncated to `options.limit`. Callers trust the
    /// result completely and do not re-filter or re-sort it.
    async fn query_documents(
        &self,
        table: &str,
        options: QueryOptions,
    ) -> DatabaseResult<Vec<Document>>;

    /// Persists `document` under `id` in `table`, replacing any previous version.
    async fn save_document(
        &self,
        table: &str,
        id: &DocumentId,
        document: Document,
    ) -> DatabaseResult<()>;

    /// Deletes the document with `id` from `table`.
    ///
    /// Must be idempotent: deleting a missing document succeeds.
    async fn delete_document(&self, table: &str, id: &DocumentId) -> DatabaseResult<()>;

    /// Rewrites the document with `id` in `table` through `update` and persists the result.
    ///
    /// Returns `Ok(false)` without calling `update` if no such document exists. This is the
    /// read-modify-write used by `patch` and `replace`, and it must be atomic per identifier.
    /// The default implementation is a plain read followed by a save; backends that do not
    /// serialize those calls themselves must override it.
    async fn update_document(
        &self,
        table: &str,
        id: &DocumentId,
        update: DocumentUpdate,
    ) -> DatabaseResult<bool> {
        match self.get_document_by_table_and_id(table, id).await? {
            Some(existing) => {
                self.save_document(table, id, update(existing)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Transformation applied to a stored document by [`StoreBackend::update_document`].
pub type DocumentUpdate = Box<dyn FnOnce(Document) -> Document + Send>;

macro_rules! forward_store_backend {
    ($($ty:ty),+) => {$(
        #[async_trait]
        impl<B> StoreBackend for $ty
        where
            B: StoreBackend + ?Sized,
        {
            async fn get_document(&self, id: &DocumentId) -> DatabaseResult<Option<Document>> {
                (**self).get_document(id).await
            }

            async fn get_document_by_table_and_id(
                &self,
                table: &str,
                id: &DocumentId,
            ) -> DatabaseResult<Option<Document>> {
                (**self)
                    .get_document_by_table_and_id(table, id)
                    .await
            }

            async fn query_documents(
                &self,
                table: &str,
                options: QueryOptions,
            ) -> DatabaseResult<Vec<Document>> {
                (**self)
                    .query_documents(table, options)
                    .await
            }

            async fn save_document(
                &self,
                table: &str,
                id: &DocumentId,
                document: Document,
            ) -> DatabaseResult<()> {
                (**self)
                    .save_document(table, id, document)
                    .await
            }

            async fn delete_document(&self, table: &str, id: &DocumentId) -> DatabaseResult<()> {
                (**self)
                    .delete_document(table, id)
                    .await
            }

            async fn update_document(
                &self,
                table: &str,
                id: &DocumentId,
                update: DocumentUpdate,
            ) -> DatabaseResult<bool> {
                (**self)
                    .update_document(table, id, update)
                    .await
            }
        }
    )+};
}

forward_store_backend!(&B, Box<B>, Arc<B>);

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DatabaseResult<Self::Backend>;
}
