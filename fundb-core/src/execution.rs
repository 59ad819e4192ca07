//! Query execution state machine.
//!
//! A [`QueryExecution`] accumulates index selection, index range, filters and sort order, then
//! runs exactly once through one of the terminal operations: [`collect`](QueryExecution::collect),
//! [`first`](QueryExecution::first), [`unique`](QueryExecution::unique),
//! [`take`](QueryExecution::take) or [`paginate`](QueryExecution::paginate). Terminals take
//! `self`, so a query cannot be reused after it ran.
//!
//! Document retrieval is delegated to a [`QueryFetcher`]. The state machine trusts its output:
//! it never re-filters or re-sorts.
//!
//! ```ignore
//! let adults = reader
//!     .query("users")
//!     .with_index("by_team", |r| r.eq("team", "blue"))
//!     .filter(Filter::gte("age", 18))
//!     .order(SortOrder::Desc)
//!     .take(10)
//!     .await?;
//! ```

use async_trait::async_trait;
use std::fmt;

use crate::{
    document::Document,
    error::{DatabaseError, DatabaseResult},
    page::{PaginationOptions, PaginationResult},
    query::{Expr, IndexRange, QueryOptions, SortOrder},
};

/// Retrieves documents for an accumulated query.
///
/// Implementations must honour every option: index selection and range, filters (ANDed),
/// order by `_creationTime`, cursor resumption and limit.
#[async_trait]
pub trait QueryFetcher: Send + Sync {
    async fn fetch(&self, table: &str, options: QueryOptions) -> DatabaseResult<Vec<Document>>;
}

/// A single logical query over one table.
pub struct QueryExecution<'a> {
    table: String,
    options: QueryOptions,
    fetcher: &'a dyn QueryFetcher,
}

impl<'a> QueryExecution<'a> {
    /// Creates an empty query over `table`.
    pub fn new(table: impl Into<String>, fetcher: &'a dyn QueryFetcher) -> Self {
        Self {
            table: table.into(),
            options: QueryOptions::default(),
            fetcher,
        }
    }

    /// Returns the table this query runs against.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the options accumulated so far.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Selects an index and describes the range to scan.
    ///
    /// `range` receives an empty [`IndexRange`] and returns it with conditions appended.
    /// Calling this again replaces the previous index and range.
    pub fn with_index(
        mut self,
        index_name: impl Into<String>,
        range: impl FnOnce(IndexRange) -> IndexRange,
    ) -> Self {
        self.options.index_name = Some(index_name.into());
        self.options.index_range = range(IndexRange::new()).into_conditions();
        self
    }

    /// Adds a filter expression. Multiple filters are ANDed.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.options.filters.push(expr);
        self
    }

    /// Sets the sort order by `_creationTime`.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.options.order = order;
        self
    }

    /// Runs the query and returns every result the fetcher produces.
    pub async fn collect(self) -> DatabaseResult<Vec<Document>> {
        tracing::trace!(
            table = %self.table,
            index = ?self.options.index_name,
            filters = self.options.filters.len(),
            order = ?self.options.order,
            limit = ?self.options.limit,
            "executing query"
        );

        self.fetcher.fetch(&self.table, self.options).await
    }

    /// Returns the first result, if any.
    pub async fn first(mut self) -> DatabaseResult<Option<Document>> {
        self.options.limit = Some(1);
        Ok(self.collect().await?.into_iter().next())
    }

    /// Returns the only result, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MultipleResults`] if more than one document matches. Only two
    /// documents are fetched to detect this.
    pub async fn unique(mut self) -> DatabaseResult<Option<Document>> {
        self.options.limit = Some(2);
        let results = self.collect().await?;

        if results.len() > 1 {
            return Err(DatabaseError::MultipleResults(results.len()));
        }

        Ok(results.into_iter().next())
    }

    /// Returns at most `n` results.
    pub async fn take(mut self, n: usize) -> DatabaseResult<Vec<Document>> {
        self.options.limit = Some(n);
        self.collect().await
    }

    /// Returns one page of results and a cursor for the next one.
    ///
    /// An empty cursor string is treated as "from the start".
    pub async fn paginate(mut self, page: PaginationOptions) -> DatabaseResult<PaginationResult> {
        let num_items = page.num_items;

        self.options.limit = Some(num_items.saturating_add(1));
        self.options.cursor = page.cursor.filter(|cursor| !cursor.is_empty());

        Ok(PaginationResult::from_fetched(self.collect().await?, num_items))
    }
}

impl fmt::Debug for QueryExecution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecution")
            .field("table", &self.table)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
