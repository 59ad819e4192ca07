//! The closed value system stored in documents.
//!
//! A [`Value`] is produced only from validated input (see [`crate::validate`]), so every
//! stored value is finite, present and representable as data.

use bson::{Binary, Bson, spec::BinarySubtype};
use serde::{Serialize, Serializer, ser::{SerializeMap, SerializeSeq}};
use std::{cmp::Ordering, collections::BTreeMap};

use crate::{
    error::{DatabaseError, DatabaseResult},
    id::DocumentId,
};

/// A field-name to value mapping.
pub type Fields = BTreeMap<String, Value>;

/// A document field value.
///
/// Equality is kind-exact: `Int(1)` and `Float(1.0)` are different values. Ordering, exposed
/// through [`Value::compare`], treats both numeric kinds as numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Finite floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// String-keyed mapping of values.
    Map(Fields),
}

impl Value {
    /// Short name of this value's kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
        }
    }

    /// Compares two values for the ordering operators.
    ///
    /// Integers and floats compare numerically with each other, strings and byte sequences
    /// lexicographically, booleans with `false < true`. Null compares equal only to null.
    /// Every other pairing, including arrays and maps, is incomparable and yields `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => compare_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => compare_int_float(*b, *a).map(Ordering::reverse),
            (Value::String(a), Value::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the string content if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the map content if this is a map.
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Converts this value to BSON.
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Null => Bson::Null,
            Value::Bool(b) => Bson::Boolean(*b),
            Value::Int(i) => Bson::Int64(*i),
            Value::Float(f) => Bson::Double(*f),
            Value::String(s) => Bson::String(s.clone()),
            Value::Bytes(bytes) => Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes: bytes.clone(),
            }),
            Value::Array(items) => Bson::Array(items.iter().map(Value::to_bson).collect()),
            Value::Map(map) => Bson::Document(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_bson()))
                    .collect(),
            ),
        }
    }
}

/// Orders an integer against a float without rounding the integer through `f64`.
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    // 2^63, the first float above i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= LIMIT {
        return Some(Ordering::Less);
    }
    if float < -LIMIT {
        return Some(Ordering::Greater);
    }

    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&float),
        ordering => Some(ordering),
    }
}

/// Converts validated BSON into a [`Value`].
///
/// Run [`crate::validate::validate`] first to get a path-qualified error; this conversion
/// only reports the first unsupported kind it meets.
impl TryFrom<Bson> for Value {
    type Error = DatabaseError;

    fn try_from(bson: Bson) -> DatabaseResult<Self> {
        Ok(match bson {
            Bson::Null => Value::Null,
            Bson::Boolean(b) => Value::Bool(b),
            Bson::Int32(i) => Value::Int(i as i64),
            Bson::Int64(i) => Value::Int(i),
            Bson::Double(f) if f.is_finite() => Value::Float(f),
            Bson::String(s) => Value::String(s),
            Bson::Binary(binary) => Value::Bytes(binary.bytes),
            Bson::DateTime(dt) => Value::Int(dt.timestamp_millis()),
            Bson::Timestamp(ts) => Value::Int(((ts.time as i64) << 32) | ts.increment as i64),
            Bson::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<DatabaseResult<_>>()?,
            ),
            Bson::Document(doc) => Value::Map(
                doc.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<DatabaseResult<_>>()?,
            ),
            other => {
                return Err(DatabaseError::Serialization(format!(
                    "unsupported BSON value of type {:?}",
                    other.element_type()
                )));
            }
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // serde_json numbers are always finite.
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&DocumentId> for Value {
    fn from(id: &DocumentId) -> Self {
        Value::String(id.as_str().to_string())
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::String(id.into_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Fields> for Value {
    fn from(map: Fields) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => serializer.serialize_bytes(bytes),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
