//! Stored documents and their system fields.
//!
//! A [`Document`] is a mapping of user fields plus two read-only system fields: `_id` and
//! `_creationTime` (milliseconds since the Unix epoch). System fields are kept out of the user
//! field map so they can never be shadowed.

use bson::{Bson, Document as BsonDocument, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap};
use std::borrow::Cow;

use crate::{
    error::DatabaseResult,
    id::DocumentId,
    value::{Fields, Value},
};

/// Name of the identifier system field.
pub const ID_FIELD: &str = "_id";

/// Name of the creation time system field.
pub const CREATION_TIME_FIELD: &str = "_creationTime";

/// The caller-immutable fields present on every document.
pub const SYSTEM_FIELDS: [&str; 2] = [ID_FIELD, CREATION_TIME_FIELD];

/// True if `field` names a system field.
pub fn is_system_field(field: &str) -> bool {
    SYSTEM_FIELDS.contains(&field)
}

/// A document as stored and returned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    creation_time: i64,
    fields: Fields,
}

impl Document {
    /// Creates a document from its system fields and user fields.
    ///
    /// Any system field names in `fields` are dropped.
    pub fn new(id: DocumentId, creation_time: i64, mut fields: Fields) -> Self {
        fields.retain(|name, _| !is_system_field(name));

        Self { id, creation_time, fields }
    }

    /// Returns the document identifier.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Returns the creation time in milliseconds since the Unix epoch.
    pub fn creation_time(&self) -> i64 {
        self.creation_time
    }

    /// Returns the user fields, without system fields.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Consumes the document, returning its user fields.
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Looks up a top-level field, including the system fields.
    pub fn get(&self, field: &str) -> Option<Cow<'_, Value>> {
        match field {
            ID_FIELD => Some(Cow::Owned(Value::from(&self.id))),
            CREATION_TIME_FIELD => Some(Cow::Owned(Value::Int(self.creation_time))),
            _ => self.fields.get(field).map(Cow::Borrowed),
        }
    }

    /// Resolves a field name or a dotted path such as `profile.name` through nested maps.
    ///
    /// A top-level key equal to `path`, dots included, wins over the nested interpretation.
    /// Returns `None` if any segment is missing or a non-map value is traversed.
    pub fn lookup(&self, path: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = self.get(path) {
            return Some(value);
        }

        let mut segments = path.split('.');
        let first = self.get(segments.next()?)?;

        segments.try_fold(first, |current, segment| match current {
            Cow::Borrowed(Value::Map(map)) => map.get(segment).map(Cow::Borrowed),
            Cow::Owned(Value::Map(mut map)) => map.remove(segment).map(Cow::Owned),
            _ => None,
        })
    }

    /// Returns a copy of this document with `fields` shallow-merged over the user fields.
    pub fn merged(&self, fields: Fields) -> Document {
        let mut merged = self.fields.clone();
        merged.extend(fields);

        Document::new(self.id.clone(), self.creation_time, merged)
    }

    /// Returns a copy of this document whose user fields are exactly `fields`.
    pub fn replaced(&self, fields: Fields) -> Document {
        Document::new(self.id.clone(), self.creation_time, fields)
    }

    /// Returns the whole document, system fields included, as a map value.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert(ID_FIELD.to_string(), Value::from(&self.id));
        map.insert(CREATION_TIME_FIELD.to_string(), Value::Int(self.creation_time));

        Value::Map(map)
    }

    /// Converts the whole document, system fields included, to BSON.
    pub fn to_bson(&self) -> DatabaseResult<BsonDocument> {
        match serialize_to_bson(self)? {
            Bson::Document(doc) => Ok(doc),
            other => Err(crate::error::DatabaseError::Serialization(format!(
                "document serialized to {:?}",
                other.element_type()
            ))),
        }
    }

    /// Deserializes the whole document, system fields included, into `T`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Deserialize)]
    /// struct User {
    ///     #[serde(rename = "_id")]
    ///     id: DocumentId,
    ///     name: String,
    /// }
    ///
    /// let user: User = document.decode()?;
    /// ```
    pub fn decode<T: DeserializeOwned>(&self) -> DatabaseResult<T> {
        Ok(deserialize_from_bson(Bson::Document(self.to_bson()?))?)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        map.serialize_entry(CREATION_TIME_FIELD, &self.creation_time)?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{SeededRandom, create_id};
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> Document {
        let id = create_id("users", &SeededRandom::new(3)).unwrap();
        let fields = match Value::from(json!({
            "name": "Ada",
            "profile": { "city": "London", "langs": ["en"] },
        })) {
            Value::Map(map) => map,
            _ => unreachable!(),
        };

        Document::new(id, 1_700_000_000_000, fields)
    }

    #[test]
    fn system_fields_are_resolved() {
        let doc = sample();

        assert_eq!(doc.get(ID_FIELD).unwrap().as_str(), Some(doc.id().as_str()));
        assert_eq!(
            doc.get(CREATION_TIME_FIELD).unwrap().into_owned(),
            Value::Int(1_700_000_000_000)
        );
    }

    #[test]
    fn new_strips_system_fields_from_user_map() {
        let mut fields = Fields::new();
        fields.insert(ID_FIELD.to_string(), Value::from("spoofed"));
        fields.insert("a".to_string(), Value::Int(1));

        let doc = Document::new(sample().id().clone(), 0, fields);
        assert_eq!(doc.fields().len(), 1);
        assert_ne!(doc.get(ID_FIELD).unwrap().as_str(), Some("spoofed"));
    }

    #[test]
    fn dotted_lookup_walks_maps() {
        let doc = sample();

        assert_eq!(doc.lookup("profile.city").unwrap().as_str(), Some("London"));
        assert!(doc.lookup("profile.missing").is_none());
        assert!(doc.lookup("name.first").is_none());
    }

    #[test]
    fn serializes_flat_with_system_fields() {
        let doc = sample();
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["_id"], json!(doc.id().as_str()));
        assert_eq!(json["_creationTime"], json!(1_700_000_000_000i64));
        assert_eq!(json["profile"]["city"], json!("London"));
    }

    #[test]
    fn decodes_into_typed_struct() {
        #[derive(Deserialize)]
        struct User {
            #[serde(rename = "_id")]
            id: DocumentId,
            name: String,
        }

        let doc = sample();
        let user: User = doc.decode().unwrap();

        assert_eq!(&user.id, doc.id());
        assert_eq!(user.name, "Ada");
    }
}
