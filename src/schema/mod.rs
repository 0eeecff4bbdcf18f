//! Schema system - declarations, registries and validation

pub mod collection;
pub mod registry;
pub mod validator;

pub use collection::{Collection, CollectionRegistry, CHARACTERS};
pub use registry::SchemaRegistry;
pub use validator::{SchemaViolation, ValidationError, ValidationIssue, ValidationResult, Validator};
