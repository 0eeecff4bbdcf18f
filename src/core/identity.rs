//! Collection and schema-version identity

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Versions of the character record schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Legacy record: single affiliation string plus weapon
    V1,
    /// Current record: identity, skills, defense and affiliation list
    V2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }

    /// All known versions, oldest first
    pub fn all() -> &'static [SchemaVersion] {
        &[SchemaVersion::V1, SchemaVersion::V2]
    }

    /// The version new records are written in
    pub fn current() -> Self {
        SchemaVersion::V2
    }

    /// Guess the version of a raw record from its identity field.
    ///
    /// `characterName` only exists in v2 and `name` only in v1; a record
    /// carrying neither cannot be classified.
    pub fn detect(record: &JsonValue) -> Option<Self> {
        let obj = record.as_object()?;
        if obj.contains_key("characterName") {
            Some(SchemaVersion::V2)
        } else if obj.contains_key("name") {
            Some(SchemaVersion::V1)
        } else {
            None
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        SchemaVersion::current()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            _ => Err(IdParseError::InvalidVersion(s.to_string())),
        }
    }
}

/// Kind of content a collection holds, as the site framework understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// JSON/YAML data files
    Data,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Data => write!(f, "data"),
        }
    }
}

/// Record id for a file: its stem, e.g. `yisang_01` for `yisang_01.json`
pub fn record_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Errors from parsing identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("unknown schema version '{0}' (expected v1 or v2)")]
    InvalidVersion(String),

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),
}
