//! Recursive validation of document values before they are written.
//!
//! The walk is depth-first with an explicit path accumulator. Checks run in a fixed order and
//! stop at the first failure: absent, NaN, infinite, callable, opaque handle. Arrays and
//! documents are descended into; dates, timestamps and binary values are atomic leaves.

use bson::{Bson, Document as BsonDocument};
use std::fmt;

use crate::{
    error::{DatabaseError, DatabaseResult},
    value::{Fields, Value},
};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field or map key.
    Key(String),
    /// An array position.
    Index(usize),
}

/// Location of a value inside a document, rendered as `profile.tags[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Creates a path rooted at a top-level field.
    pub fn root(field: impl Into<String>) -> Self {
        Self { segments: vec![PathSegment::Key(field.into())] }
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Validates a single value, reporting failures relative to `path`.
///
/// # Errors
///
/// Returns [`DatabaseError::Validation`] carrying the rendered path and a reason.
pub fn validate(value: &Bson, path: &str) -> DatabaseResult<()> {
    walk(value, &mut FieldPath::root(path))
}

/// Validates every top-level field of `fields`, seeding the path with the field name.
pub fn validate_fields(fields: &BsonDocument) -> DatabaseResult<()> {
    fields
        .iter()
        .try_for_each(|(name, value)| validate(value, name))
}

/// Validates `fields` and converts them into stored [`Fields`].
pub fn into_fields(fields: BsonDocument) -> DatabaseResult<Fields> {
    validate_fields(&fields)?;

    fields
        .into_iter()
        .map(|(name, value)| Ok((name, Value::try_from(value)?)))
        .collect()
}

fn walk(value: &Bson, path: &mut FieldPath) -> DatabaseResult<()> {
    if let Some(reason) = rejection(value) {
        return Err(DatabaseError::validation(path.to_string(), reason));
    }

    match value {
        Bson::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                walk(item, path)?;
                path.pop();
            }
        }
        Bson::Document(doc) => {
            for (key, item) in doc {
                path.push(PathSegment::Key(key.clone()));
                walk(item, path)?;
                path.pop();
            }
        }
        _ => {}
    }

    Ok(())
}

fn rejection(value: &Bson) -> Option<&'static str> {
    match value {
        Bson::Undefined => Some("undefined is not allowed."),
        Bson::Double(f) if f.is_nan() => Some("NaN is not allowed."),
        Bson::Double(f) if f.is_infinite() => Some("Infinity is not allowed."),
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => {
            Some("functions are not allowed.")
        }
        Bson::Null
        | Bson::Boolean(_)
        | Bson::Int32(_)
        | Bson::Int64(_)
        | Bson::Double(_)
        | Bson::String(_)
        | Bson::Binary(_)
        | Bson::DateTime(_)
        | Bson::Timestamp(_)
        | Bson::Array(_)
        | Bson::Document(_) => None,
        _ => Some("symbols and opaque handles are not allowed."),
    }
}
