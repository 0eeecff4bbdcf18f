//! CLI command implementations

pub mod cleanup;
pub mod completions;
pub mod dupes;
pub mod init;
pub mod list;
pub mod migrate;
pub mod new;
pub mod remove;
pub mod schema;
pub mod status;
pub mod validate;
