//! Error types and result types for document database operations.
//!
//! Every fallible operation in this crate returns [`DatabaseResult<T>`]. Errors are raised at
//! the point of detection and propagate to the caller unchanged; the engine never retries or
//! recovers internally. Absence is not an error: [`Reader::get`](crate::reader::Reader::get)
//! yields `None` and [`Writer::delete`](crate::writer::Writer::delete) is a no-op for unknown
//! identifiers.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when reading or writing documents.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Malformed arguments to identifier creation, such as an empty table name.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A string failed the identifier character or length checks.
    #[error("Invalid identifier format: {0}")]
    InvalidFormat(String),
    /// A document field value is outside the supported value system.
    #[error("Invalid value at '{path}': {reason}")]
    Validation {
        /// Dotted/bracketed path of the offending value, e.g. `profile.tags[2]`.
        path: String,
        /// Human readable reason.
        reason: String,
    },
    /// The caller tried to set or modify `_id` or `_creationTime`.
    #[error("System field '{0}' cannot be set or modified")]
    SystemFieldViolation(String),
    /// `patch` was called without any fields.
    #[error("Update must contain at least one field")]
    EmptyUpdate,
    /// The target document of a `patch` or `replace` does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),
    /// `unique()` matched more than one document.
    #[error("Expected at most one document, found {0}")]
    MultipleResults(usize),
    /// A pagination cursor could not be decoded or no longer resolves.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DatabaseError {
    /// Builds a [`DatabaseError::Validation`] from a path and reason.
    pub fn validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DatabaseError::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for document database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

impl From<BsonError> for DatabaseError {
    fn from(err: BsonError) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DatabaseError {
    fn from(err: SerdeJsonError) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}
