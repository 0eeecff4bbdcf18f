//! Record type definitions
//!
//! - [`Character`] - current (v2) character record
//! - [`CharacterV1`] - legacy record, read-only, see [`migrate`]

pub mod character;
pub mod migrate;

pub use character::{Character, CharacterV1, Skill, Skills};
pub use migrate::{migrate_v1, upgrade, MigrationError, MigrationOptions};
