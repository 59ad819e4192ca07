//! Write access to documents.
//!
//! A [`Writer`] offers everything a [`Reader`] does plus `insert`, `patch`, `replace` and
//! `delete`. Every write runs the same pipeline before touching storage: reject system fields,
//! validate values, then resolve the target document.
//!
//! # Example
//!
//! ```ignore
//! use fundb::{prelude::*, memory::InMemoryStore};
//! use bson::doc;
//!
//! let writer = Writer::new(InMemoryStore::new());
//!
//! let id = writer.insert("users", doc! { "name": "Ada", "age": 36 }).await?;
//! writer.patch(&id, doc! { "age": 37 }).await?;
//! writer.replace(&id, doc! { "name": "Ada Lovelace" }).await?;
//! writer.delete(&id).await?;
//! ```

use bson::{Bson, Document as BsonDocument, ser::serialize_to_bson};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    backend::{DocumentUpdate, StoreBackend},
    document::{Document, is_system_field},
    error::{DatabaseError, DatabaseResult},
    execution::QueryExecution,
    id::{DocumentId, IdPolicy, OsRandom, RandomSource},
    reader::Reader,
    validate::into_fields,
};

/// Read-write view of a document database bound to a storage backend.
#[derive(Debug)]
pub struct Writer<B: StoreBackend> {
    reader: Reader<B>,
    random: Arc<dyn RandomSource>,
}

impl<B: StoreBackend> Writer<B> {
    /// Creates a writer over `backend` using OS randomness for identifiers.
    pub fn new(backend: B) -> Self {
        Self::builder(backend).build()
    }

    /// Creates a builder for a writer with custom settings.
    pub fn builder(backend: B) -> WriterBuilder<B> {
        WriterBuilder::new(backend)
    }

    /// Returns the read half of this writer.
    pub fn reader(&self) -> &Reader<B> {
        &self.reader
    }

    /// See [`Reader::get`].
    pub async fn get(&self, id: &DocumentId) -> DatabaseResult<Option<Document>> {
        self.reader.get(id).await
    }

    /// See [`Reader::query`].
    pub fn query(&self, table: &str) -> QueryExecution<'_> {
        self.reader.query(table)
    }

    /// See [`Reader::normalize_id`].
    pub fn normalize_id(&self, table: &str, raw: &str) -> Option<DocumentId> {
        self.reader.normalize_id(table, raw)
    }

    /// Inserts a new document into `table` and returns its identifier.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::SystemFieldViolation`] if `fields` names `_id` or `_creationTime`.
    /// - [`DatabaseError::Validation`] if any value is outside the value system.
    /// - [`DatabaseError::InvalidInput`] if `table` is not a usable table name.
    pub async fn insert(&self, table: &str, fields: BsonDocument) -> DatabaseResult<DocumentId> {
        reject_system_fields(&fields)?;
        let fields = into_fields(fields)?;

        let id = DocumentId::generate(table, self.random.as_ref())?;
        let document = Document::new(id.clone(), Utc::now().timestamp_millis(), fields);

        self.backend()
            .save_document(table, &id, document)
            .await?;

        tracing::debug!(table, id = %id, "inserted document");

        Ok(id)
    }

    /// Serializes `value` and inserts it as a new document.
    ///
    /// `value` must serialize to a BSON document.
    pub async fn insert_serialized<T: Serialize + ?Sized>(
        &self,
        table: &str,
        value: &T,
    ) -> DatabaseResult<DocumentId> {
        match serialize_to_bson(value)? {
            Bson::Document(fields) => self.insert(table, fields).await,
            other => Err(DatabaseError::InvalidInput(format!(
                "expected a document, got {:?}",
                other.element_type()
            ))),
        }
    }

    /// Shallow-merges `fields` over an existing document.
    ///
    /// New keys are added, existing keys are overwritten and other keys are preserved.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::EmptyUpdate`] if `fields` is empty.
    /// - [`DatabaseError::SystemFieldViolation`] if `fields` names a system field.
    /// - [`DatabaseError::Validation`] if any value is outside the value system.
    /// - [`DatabaseError::NotFound`] if no document exists at `id`.
    pub async fn patch(&self, id: &DocumentId, fields: BsonDocument) -> DatabaseResult<()> {
        if fields.is_empty() {
            return Err(DatabaseError::EmptyUpdate);
        }
        reject_system_fields(&fields)?;
        let fields = into_fields(fields)?;

        let table = self
            .update(id, Box::new(move |existing: Document| existing.merged(fields)))
            .await?;

        tracing::debug!(table, id = %id, "patched document");

        Ok(())
    }

    /// Replaces every user field of an existing document with `fields`.
    ///
    /// `_id` and `_creationTime` are preserved; all other previous fields are dropped.
    ///
    /// # Errors
    ///
    /// Same as [`Writer::patch`], except that an empty `fields` is allowed.
    pub async fn replace(&self, id: &DocumentId, fields: BsonDocument) -> DatabaseResult<()> {
        reject_system_fields(&fields)?;
        let fields = into_fields(fields)?;

        let table = self
            .update(id, Box::new(move |existing: Document| existing.replaced(fields)))
            .await?;

        tracing::debug!(table, id = %id, "replaced document");

        Ok(())
    }

    /// Deletes the document at `id`.
    ///
    /// Idempotent: deleting a missing document, or an identifier without a table prefix,
    /// succeeds without doing anything.
    pub async fn delete(&self, id: &DocumentId) -> DatabaseResult<()> {
        let Ok(table) = id.table() else {
            tracing::debug!(id = %id, "ignoring delete of identifier without table");
            return Ok(());
        };

        self.backend()
            .delete_document(table, id)
            .await?;

        tracing::debug!(table, id = %id, "deleted document");

        Ok(())
    }

    fn backend(&self) -> &B {
        self.reader.backend()
    }

    async fn update<'i>(
        &self,
        id: &'i DocumentId,
        update: DocumentUpdate,
    ) -> DatabaseResult<&'i str> {
        let table = id.table()?;

        if !self.backend().update_document(table, id, update).await? {
            return Err(DatabaseError::NotFound(id.to_string()));
        }

        Ok(table)
    }
}

fn reject_system_fields(fields: &BsonDocument) -> DatabaseResult<()> {
    match fields.keys().find(|key| is_system_field(key)) {
        Some(field) => Err(DatabaseError::SystemFieldViolation(field.clone())),
        None => Ok(()),
    }
}

/// Builder for [`Writer`].
///
/// ```ignore
/// let writer = Writer::builder(InMemoryStore::new())
///     .random_source(SeededRandom::new(42))
///     .id_policy(IdPolicy::MatchTable)
///     .build();
/// ```
pub struct WriterBuilder<B: StoreBackend> {
    backend: B,
    random: Option<Arc<dyn RandomSource>>,
    id_policy: IdPolicy,
}

impl<B: StoreBackend> WriterBuilder<B> {
    /// Creates a builder with default settings.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            random: None,
            id_policy: IdPolicy::default(),
        }
    }

    /// Sets the random byte source used to generate identifiers.
    pub fn random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Some(Arc::new(random));
        self
    }

    /// Sets how `normalize_id` treats the embedded table prefix.
    pub fn id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    /// Builds the writer. Uses [`OsRandom`] unless another source was set.
    pub fn build(self) -> Writer<B> {
        Writer {
            reader: Reader::new(self.backend).with_id_policy(self.id_policy),
            random: self.random.unwrap_or_else(|| Arc::new(OsRandom)),
        }
    }
}
