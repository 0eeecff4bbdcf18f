//! Embedded JSON Schema documents, keyed by collection and version

use rust_embed::Embed;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::core::identity::SchemaVersion;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Raw schema text for every `(collection, version)` pair shipped with the binary
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<(String, SchemaVersion), Cow<'static, str>>,
}

impl SchemaRegistry {
    /// Build a registry from the schemas embedded at compile time.
    ///
    /// Files follow `<collection>.<version>.schema.json`; anything else is ignored.
    pub fn embedded() -> Self {
        let mut schemas = BTreeMap::new();

        for filename in EmbeddedSchemas::iter() {
            let Some((collection, version)) = parse_schema_filename(&filename) else {
                tracing::debug!(file = %filename, "skipping schema with unrecognised name");
                continue;
            };
            let Some(file) = EmbeddedSchemas::get(&filename) else {
                continue;
            };
            let text = match file.data {
                Cow::Borrowed(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
                Cow::Owned(bytes) => String::from_utf8(bytes).ok().map(Cow::Owned),
            };
            if let Some(text) = text {
                schemas.insert((collection, version), text);
            }
        }

        Self { schemas }
    }

    /// Registry with no schemas
    pub fn empty() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// Register (or replace) a schema
    pub fn insert(&mut self, collection: &str, version: SchemaVersion, schema: impl Into<String>) {
        self.schemas
            .insert((collection.to_string(), version), Cow::Owned(schema.into()));
    }

    /// Get the schema text for a collection version
    pub fn get(&self, collection: &str, version: SchemaVersion) -> Option<&str> {
        self.schemas
            .get(&(collection.to_string(), version))
            .map(|s| s.as_ref())
    }

    /// Versions registered for a collection, oldest first
    pub fn versions(&self, collection: &str) -> Vec<SchemaVersion> {
        self.schemas
            .keys()
            .filter(|(name, _)| name == collection)
            .map(|(_, version)| *version)
            .collect()
    }

    /// Iterate over `(collection, version, schema)` triples
    pub fn iter(&self) -> impl Iterator<Item = (&str, SchemaVersion, &str)> {
        self.schemas
            .iter()
            .map(|((name, version), schema)| (name.as_str(), *version, schema.as_ref()))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::embedded()
    }
}

fn parse_schema_filename(filename: &str) -> Option<(String, SchemaVersion)> {
    let stem = filename.strip_suffix(".schema.json")?;
    let (collection, version) = stem.rsplit_once('.')?;
    Some((collection.to_string(), version.parse().ok()?))
}
