//! Core module - project layout, configuration, loading and the catalog

pub mod catalog;
pub mod config;
pub mod identity;
pub mod loader;
pub mod project;

pub use catalog::{Catalog, CatalogError, CatalogStatus, DuplicateGroup, PendingImage};
pub use config::Config;
pub use identity::{CollectionKind, IdParseError, SchemaVersion};
pub use loader::{LoadError, LoadedRecord, RecordLoader};
pub use project::{Project, ProjectError};
