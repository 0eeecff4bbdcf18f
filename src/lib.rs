//! Character Codex
//!
//! Schema declarations, validation and catalog tooling for the `characters`
//! content collection of a static site. Records are plain JSON files, one
//! per character, validated against versioned JSON Schemas.

pub mod cli;
pub mod core;
pub mod entities;
pub mod json;
pub mod schema;
