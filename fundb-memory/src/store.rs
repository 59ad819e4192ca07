//! In-memory storage implementation.
//!
//! Documents live in per-table hash maps behind a single async-aware read-write lock. Every
//! write takes the write lock, and `update_document` holds it across its read and its save, so
//! a patch or replace is never interleaved with another write.
//!
//! Query results are ordered by `(_creationTime, insertion sequence)`, reversed for descending
//! order. Each table remembers the position of every document ever saved into it, including
//! after deletion, so a pagination cursor keeps resolving even if its document was removed in
//! between pages. [`InMemoryStore::compact`] drops the positions of deleted documents.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};

use fundb_core::{
    backend::{DocumentUpdate, StoreBackend, StoreBackendBuilder},
    document::Document,
    error::{DatabaseError, DatabaseResult},
    evaluator::{matches_all, matches_index_range},
    id::DocumentId,
    page::decode_cursor,
    query::{QueryOptions, SortOrder},
};

/// Sort key of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Position {
    creation_time: i64,
    sequence: u64,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    position: Position,
}

#[derive(Debug, Default)]
struct TableState {
    documents: HashMap<DocumentId, StoredDocument>,
    /// Positions of every document saved into this table, kept after deletion.
    positions: HashMap<DocumentId, Position>,
}

impl TableState {
    /// Drops positions whose document no longer exists. Returns how many were dropped.
    fn compact(&mut self) -> usize {
        let before = self.positions.len();
        let documents = &self.documents;
        self.positions.retain(|id, _| documents.contains_key(id));

        before - self.positions.len()
    }
}

#[derive(Debug, Default)]
struct StoreState {
    tables: HashMap<String, TableState>,
    next_sequence: u64,
}

impl StoreState {
    fn save(&mut self, table: &str, id: &DocumentId, document: Document) {
        let table_state = self.tables.entry(table.to_string()).or_default();
        let next_sequence = &mut self.next_sequence;

        let position = *table_state
            .positions
            .entry(id.clone())
            .or_insert_with(|| {
                let sequence = *next_sequence;
                *next_sequence += 1;

                Position {
                    creation_time: document.creation_time(),
                    sequence,
                }
            });

        table_state
            .documents
            .insert(id.clone(), StoredDocument { document, position });
    }

    fn get(&self, table: &str, id: &DocumentId) -> Option<Document> {
        self.tables
            .get(table)?
            .documents
            .get(id)
            .map(|stored| stored.document.clone())
    }
}

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state; clones share the
/// same data.
///
/// # Performance
///
/// Queries scan every document of a table. Index range conditions are evaluated as field
/// predicates and the index name is informational only.
///
/// Deleting a document keeps its cursor position, so memory grows with every document ever
/// stored until [`InMemoryStore::compact`] is called.
///
/// # Example
///
/// ```ignore
/// use fundb_memory::InMemoryStore;
/// use fundb_core::writer::Writer;
///
/// let writer = Writer::new(InMemoryStore::new());
/// let id = writer.insert("users", bson::doc! { "name": "Alice" }).await?;
/// assert!(writer.get(&id).await?.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for an `InMemoryStore`, optionally seeded with documents.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns the number of documents currently stored in `table`.
    pub async fn len(&self, table: &str) -> usize {
        self.state
            .read()
            .await
            .tables
            .get(table)
            .map_or(0, |table_state| table_state.documents.len())
    }

    /// Forgets the cursor positions of deleted documents and returns how many were dropped.
    ///
    /// Cursors pointing at those documents fail with [`DatabaseError::InvalidCursor`]
    /// afterwards; cursors of live documents are unaffected.
    pub async fn compact(&self) -> usize {
        let dropped: usize = self
            .state
            .write()
            .await
            .tables
            .values_mut()
            .map(TableState::compact)
            .sum();

        tracing::debug!(dropped, "compacted cursor positions");

        dropped
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn get_document(&self, id: &DocumentId) -> DatabaseResult<Option<Document>> {
        let Ok(table) = id.table() else {
            return Ok(None);
        };

        Ok(self.state.read().await.get(table, id))
    }

    async fn get_document_by_table_and_id(
        &self,
        table: &str,
        id: &DocumentId,
    ) -> DatabaseResult<Option<Document>> {
        Ok(self.state.read().await.get(table, id))
    }

    async fn query_documents(
        &self,
        table: &str,
        options: QueryOptions,
    ) -> DatabaseResult<Vec<Document>> {
        tracing::trace!(
            table,
            index = ?options.index_name,
            range = options.index_range.len(),
            filters = options.filters.len(),
            "scanning table"
        );

        let state = self.state.read().await;
        let table_state = state.tables.get(table);

        let resume_after = match options.cursor.as_deref() {
            Some(cursor) => {
                let id = decode_cursor(cursor)?;
                let position = table_state
                    .and_then(|table_state| table_state.positions.get(&id))
                    .copied()
                    .ok_or_else(|| {
                        DatabaseError::InvalidCursor(format!("unknown document {id} in {table}"))
                    })?;
                Some(position)
            }
            None => None,
        };

        let Some(table_state) = table_state else {
            return Ok(Vec::new());
        };

        let mut matched = table_state
            .documents
            .values()
            .filter(|stored| {
                matches_index_range(&stored.document, &options.index_range)
                    && matches_all(&stored.document, &options.filters)
            })
            .collect::<Vec<_>>();

        matched.sort_by_key(|stored| stored.position);
        if options.order == SortOrder::Desc {
            matched.reverse();
        }

        Ok(matched
            .into_iter()
            .filter(|stored| match (resume_after, options.order) {
                (None, _) => true,
                (Some(after), SortOrder::Asc) => stored.position > after,
                (Some(after), SortOrder::Desc) => stored.position < after,
            })
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|stored| stored.document.clone())
            .collect())
    }

    async fn save_document(
        &self,
        table: &str,
        id: &DocumentId,
        document: Document,
    ) -> DatabaseResult<()> {
        let mut guard = self.state.write().await;
        guard.save(table, id, document);

        tracing::trace!(table, id = %id, "saved document");

        Ok(())
    }

    async fn delete_document(&self, table: &str, id: &DocumentId) -> DatabaseResult<()> {
        let removed = self
            .state
            .write()
            .await
            .tables
            .get_mut(table)
            .and_then(|table_state| table_state.documents.remove(id))
            .is_some();

        tracing::trace!(table, id = %id, removed, "deleted document");

        Ok(())
    }

    async fn update_document(
        &self,
        table: &str,
        id: &DocumentId,
        update: DocumentUpdate,
    ) -> DatabaseResult<bool> {
        let mut guard = self.state.write().await;

        let Some(existing) = guard.get(table, id) else {
            return Ok(false);
        };
        guard.save(table, id, update(existing));

        tracing::trace!(table, id = %id, "updated document");

        Ok(true)
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use fundb_memory::InMemoryStore;
/// use fundb_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_document("users", existing_user)
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    seed: Vec<(String, Document)>,
}

impl InMemoryStoreBuilder {
    /// Seeds `table` with an already-built document. Seeds keep their order.
    ///
    /// The table prefix of the document's identifier must equal `table`; this is checked by
    /// [`build`](StoreBackendBuilder::build).
    pub fn with_document(mut self, table: impl Into<String>, document: Document) -> Self {
        self.seed.push((table.into(), document));
        self
    }

    /// Seeds `table` with several already-built documents.
    pub fn with_documents(
        mut self,
        table: impl Into<String>,
        documents: impl IntoIterator<Item = Document>,
    ) -> Self {
        let table = table.into();
        self.seed
            .extend(documents.into_iter().map(|document| (table.clone(), document)));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DatabaseResult<Self::Backend> {
        let mut state = StoreState::default();

        for (table, document) in self.seed {
            let id = document.id().clone();

            if id.table()? != table {
                return Err(DatabaseError::InvalidInput(format!(
                    "document {id} cannot be seeded into table '{table}'"
                )));
            }

            state.save(&table, &id, document);
        }

        Ok(InMemoryStore { state: Arc::new(RwLock::new(state)) })
    }
}
