//! Record loading utilities
//!
//! Reads one-JSON-object-per-file records from a directory, validates each
//! against the schema version it was written in, and hands back v2
//! [`Character`]s regardless of the on-disk version.

use miette::Diagnostic;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::SchemaVersion;
use crate::entities::character::Character;
use crate::entities::migrate::{upgrade, MigrationError, MigrationOptions};
use crate::json::JsonSyntaxError;
use crate::schema::{ValidationError, ValidationIssue, Validator};

/// A record read from disk
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub path: PathBuf,
    /// Version the file is written in
    pub version: SchemaVersion,
    /// The record in v2 shape, migrated in memory if needed
    pub character: Character,
    pub warnings: Vec<ValidationIssue>,
}

impl LoadedRecord {
    pub fn is_legacy(&self) -> bool {
        self.version != SchemaVersion::current()
    }
}

/// Everything that can go wrong reading one record
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] ValidationError),

    #[error("{path}: {source}")]
    Migration {
        path: PathBuf,
        source: MigrationError,
    },
}

/// Record loader bound to a validator and migration settings
pub struct RecordLoader<'a> {
    validator: &'a Validator,
    options: MigrationOptions,
    fallback: SchemaVersion,
}

impl<'a> RecordLoader<'a> {
    pub fn new(validator: &'a Validator) -> Self {
        Self {
            validator,
            options: MigrationOptions::default(),
            fallback: SchemaVersion::current(),
        }
    }

    pub fn with_options(mut self, options: MigrationOptions) -> Self {
        self.options = options;
        self
    }

    /// Version assumed when a record carries neither v1 nor v2 identity fields
    pub fn with_fallback(mut self, version: SchemaVersion) -> Self {
        self.fallback = version;
        self
    }

    /// Read, validate and (if legacy) migrate one record file
    pub fn load(&self, path: &Path) -> Result<LoadedRecord, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path.display().to_string();

        let value: JsonValue = serde_json::from_str(&content)
            .map_err(|e| JsonSyntaxError::from_serde_error(&e, &content, &filename))?;
        let version = SchemaVersion::detect(&value).unwrap_or(self.fallback);

        let result = self.validator.iter_errors(&content, &filename, version)?;
        let character =
            upgrade(value, Some(version), &self.options).map_err(|source| LoadError::Migration {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::trace!(path = %path.display(), %version, "loaded record");

        Ok(LoadedRecord {
            path: path.to_path_buf(),
            version,
            character,
            warnings: result.warnings,
        })
    }

    /// Load every record in a directory, keeping failures alongside successes
    pub fn load_dir(&self, dir: &Path) -> (Vec<LoadedRecord>, Vec<(PathBuf, LoadError)>) {
        let mut loaded = Vec::new();
        let mut failed = Vec::new();

        for path in record_files(dir) {
            match self.load(&path) {
                Ok(record) => loaded.push(record),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "record failed to load");
                    failed.push((path, e));
                }
            }
        }

        (loaded, failed)
    }

    /// Load the record with the given id, if its file exists
    pub fn load_id(&self, dir: &Path, id: &str) -> Option<Result<LoadedRecord, LoadError>> {
        let path = dir.join(format!("{}.json", id));
        path.is_file().then(|| self.load(&path))
    }
}

/// All `*.json` files directly inside `dir`, sorted by name
pub fn record_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let Ok(entries) = fs::read_dir(dir) else {
        return files;
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "json") {
            files.push(path);
        }
    }

    files.sort();
    files
}

/// Write a record as pretty-printed JSON with a trailing newline
pub fn write_record(path: &Path, character: &Character) -> std::io::Result<()> {
    let value = serde_json::to_value(character).map_err(std::io::Error::other)?;
    write_value(path, &value)
}

/// Write any JSON value the way records are stored
pub fn write_value(path: &Path, value: &JsonValue) -> std::io::Result<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    text.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}
