//! Collection registry - the name → schema mapping the site framework discovers

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::identity::{CollectionKind, IdParseError, SchemaVersion};

/// Name of the one collection the site declares
pub const CHARACTERS: &str = "characters";

/// A named set of records sharing one schema
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub name: String,

    /// How the framework loads entries (`data` = one JSON object per file)
    #[serde(rename = "type")]
    pub kind: CollectionKind,

    /// Version new records are written in and validated against by default
    pub current: SchemaVersion,

    /// Every version the tooling can still read
    pub versions: Vec<SchemaVersion>,
}

impl Collection {
    pub fn characters() -> Self {
        Self {
            name: CHARACTERS.to_string(),
            kind: CollectionKind::Data,
            current: SchemaVersion::current(),
            versions: SchemaVersion::all().to_vec(),
        }
    }

    pub fn supports(&self, version: SchemaVersion) -> bool {
        self.versions.contains(&version)
    }
}

/// Mapping from collection name to its declaration
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, Collection>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self {
            collections: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, collection: Collection) {
        self.collections.insert(collection.name.clone(), collection);
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Look up a collection, failing with a parse error for unknown names
    pub fn require(&self, name: &str) -> Result<&Collection, IdParseError> {
        self.get(name)
            .ok_or_else(|| IdParseError::UnknownCollection(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Collection::characters());
        registry
    }
}
