//! Document identifiers.
//!
//! An identifier has the textual form `<table>_<random>` where `<random>` is 16 random bytes
//! encoded as unpadded base64url. The owning table is everything before the first underscore.
//! Identifiers are created once by the writer and never reused.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng, rngs::{OsRng, StdRng}};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{DatabaseError, DatabaseResult};

/// Maximum length of an identifier, in characters.
pub const MAX_ID_LENGTH: usize = 128;

/// Number of random bytes embedded in a generated identifier.
pub const RANDOM_BYTES: usize = 16;

// 16 bytes -> 22 base64url characters, plus the separator.
const RANDOM_SUFFIX_LENGTH: usize = 22;
const MAX_TABLE_LENGTH: usize = MAX_ID_LENGTH - RANDOM_SUFFIX_LENGTH - 1;

/// A validated document identifier.
///
/// Equality is plain, case-sensitive string equality. Serializes as its string form and
/// deserializes through the format check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a new identifier scoped to `table` using the given random source.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidInput`] if the table name is empty, whitespace-only,
    /// contains characters outside `[A-Za-z0-9-]`, or is too long to fit an identifier.
    pub fn generate(table: &str, source: &dyn RandomSource) -> DatabaseResult<Self> {
        validate_table_name(table)?;

        let mut bytes = [0u8; RANDOM_BYTES];
        source.fill_bytes(&mut bytes);

        Ok(DocumentId(format!("{}_{}", table, URL_SAFE_NO_PAD.encode(bytes))))
    }

    /// Parses a raw string into an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidFormat`] if the string fails [`is_valid_format`].
    pub fn parse(raw: impl Into<String>) -> DatabaseResult<Self> {
        let raw = raw.into();

        if !is_valid_format(&raw) {
            return Err(DatabaseError::InvalidFormat(format!(
                "'{}' is not a valid document identifier",
                raw.escape_debug()
            )));
        }

        Ok(DocumentId(raw))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name of the table embedded in this identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidFormat`] if the identifier has no table prefix.
    pub fn table(&self) -> DatabaseResult<&str> {
        extract_table(&self.0)
    }

    /// Consumes the identifier, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for DocumentId {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentId::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DatabaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocumentId::parse(value)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

/// Generates a new random identifier for `table`.
///
/// Shorthand for [`DocumentId::generate`].
pub fn create_id(table: &str, source: &dyn RandomSource) -> DatabaseResult<DocumentId> {
    DocumentId::generate(table, source)
}

/// Returns the substring before the first underscore.
///
/// # Errors
///
/// Returns [`DatabaseError::InvalidFormat`] if `id` contains no underscore.
pub fn extract_table(id: &str) -> DatabaseResult<&str> {
    id.split_once('_')
        .map(|(table, _)| table)
        .ok_or_else(|| {
            DatabaseError::InvalidFormat(format!(
                "'{}' has no table prefix",
                id.escape_debug()
            ))
        })
}

/// True iff `id` is non-empty, at most [`MAX_ID_LENGTH`] long and matches `[A-Za-z0-9_-]+`.
pub fn is_valid_format(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// How strictly [`normalize_id`] treats the embedded table prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Only the character and length checks apply. An identifier from another table
    /// normalizes successfully.
    #[default]
    Permissive,
    /// The embedded table prefix must also equal the requested table.
    MatchTable,
}

/// Returns `raw` as an identifier if it passes the format check, otherwise `None`.
///
/// Never fails. Under [`IdPolicy::Permissive`] the `table` argument is not compared against
/// the identifier's prefix.
pub fn normalize_id(table: &str, raw: &str, policy: IdPolicy) -> Option<DocumentId> {
    let id = DocumentId::parse(raw).ok()?;

    match policy {
        IdPolicy::Permissive => Some(id),
        IdPolicy::MatchTable => match id.table() {
            Ok(prefix) if prefix == table => Some(id),
            _ => None,
        },
    }
}

fn validate_table_name(table: &str) -> DatabaseResult<()> {
    if table.trim().is_empty() {
        return Err(DatabaseError::InvalidInput(
            "table name must not be empty".to_string(),
        ));
    }

    if let Some(c) = table
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(DatabaseError::InvalidInput(format!(
            "table name '{}' contains unsupported character {:?}",
            table.escape_debug(),
            c
        )));
    }

    if table.len() > MAX_TABLE_LENGTH {
        return Err(DatabaseError::InvalidInput(format!(
            "table name is {} characters long, at most {} are allowed",
            table.len(),
            MAX_TABLE_LENGTH
        )));
    }

    Ok(())
}

/// Source of random bytes for identifier generation.
///
/// Production code uses [`OsRandom`]. Tests can substitute [`SeededRandom`] to get a
/// reproducible identifier sequence.
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Fills `dest` with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Cryptographically secure randomness from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Deterministic random source seeded from a `u64`.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a seeded random source.
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        self.rng.lock().fill_bytes(dest);
    }
}
