//! Cursor-based pagination.
//!
//! A page is fetched with `limit = num_items + 1`; the extra document only signals that more
//! results exist and is not returned. The continue cursor is an opaque token derived from the
//! last document of the page. Callers must pass it back verbatim.
//!
//! The current cursor encoding is standard base64 over the JSON text `{"id":"<id>"}`. It is
//! documented for client interop but not guaranteed stable across versions.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{
    document::Document,
    error::{DatabaseError, DatabaseResult},
    id::DocumentId,
};

/// Parameters of a single page request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
    /// Number of documents per page.
    pub num_items: usize,
    /// Cursor returned by the previous page, `None` for the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl PaginationOptions {
    /// Requests the first page of `num_items` documents.
    pub fn new(num_items: usize) -> Self {
        Self { num_items, cursor: None }
    }

    /// Resumes after the given cursor.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// A page of results.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    /// Documents of this page, at most `num_items`.
    pub page: Vec<Document>,
    /// True if no documents follow this page.
    pub is_done: bool,
    /// Cursor for the next page. Empty if the page is empty.
    pub continue_cursor: String,
}

impl PaginationResult {
    /// Builds a page from the result of a `num_items + 1` fetch.
    pub fn from_fetched(mut fetched: Vec<Document>, num_items: usize) -> Self {
        let is_done = fetched.len() <= num_items;
        fetched.truncate(num_items);

        let continue_cursor = fetched
            .last()
            .map(|doc| encode_cursor(doc.id()))
            .unwrap_or_default();

        Self { page: fetched, is_done, continue_cursor }
    }
}

#[derive(Deserialize)]
struct CursorPayload {
    id: DocumentId,
}

/// Encodes a resume point after the document with the given identifier.
pub fn encode_cursor(id: &DocumentId) -> String {
    STANDARD.encode(serde_json::json!({ "id": id.as_str() }).to_string())
}

/// Decodes a cursor produced by [`encode_cursor`].
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidCursor`] if the token is not valid base64, not the expected
/// JSON shape, or carries a malformed identifier.
pub fn decode_cursor(cursor: &str) -> DatabaseResult<DocumentId> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|err| DatabaseError::InvalidCursor(err.to_string()))?;

    serde_json::from_slice::<CursorPayload>(&bytes)
        .map(|payload| payload.id)
        .map_err(|err| DatabaseError::InvalidCursor(err.to_string()))
}
