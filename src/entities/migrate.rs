//! Legacy record migration (v1 → v2)
//!
//! v1 records carry a single affiliation string and a weapon; v2 splits the
//! name into character and identity, adds skills, and turns affiliation into
//! a list. Fields v1 never had are filled with placeholders that still pass
//! the v2 schema, so a migrated file validates before anyone edits it.

use serde_json::{Number, Value as JsonValue};
use thiserror::Error;

use crate::core::identity::SchemaVersion;
use crate::entities::character::{
    split_affiliations, Character, CharacterV1, Skill, Skills, DEFAULT_IMAGE_POSITION,
};

/// Affiliation written when a record names none
pub const DEFAULT_AFFILIATION: &str = "림버스 컴퍼니";

/// Values for v2 fields that have no v1 source
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub grade: u64,
    pub release_date: String,
    pub default_affiliation: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            grade: 1,
            release_date: String::new(),
            default_affiliation: DEFAULT_AFFILIATION.to_string(),
        }
    }
}

/// Convert a v1 record into the v2 shape
pub fn migrate_v1(record: CharacterV1, options: &MigrationOptions) -> Character {
    let mut affiliation = split_affiliations(&record.affiliation);
    if affiliation.is_empty() {
        affiliation.push(options.default_affiliation.clone());
    }

    let weapon = record.weapon.trim();
    let keywords = if weapon.is_empty() {
        Vec::new()
    } else {
        vec![weapon.to_string()]
    };

    Character {
        id: record.id,
        character_name: record.name.clone(),
        identity_name: record.name,
        is_default: true,
        grade: Number::from(options.grade),
        release_date: options.release_date.clone(),
        image_position: DEFAULT_IMAGE_POSITION.to_string(),
        keywords,
        skills: Skills {
            skill1: Skill::default(),
            skill2: Skill::default(),
            skill3: Skill::default(),
            special1: None,
            special2: None,
            special3: None,
        },
        defense: Skill::default(),
        affiliation,
        image_url: record.image_url,
    }
}

/// Read a raw record of either version as a v2 character.
///
/// `from` forces the source version; otherwise it is detected.
pub fn upgrade(
    value: JsonValue,
    from: Option<SchemaVersion>,
    options: &MigrationOptions,
) -> Result<Character, MigrationError> {
    let version = match from {
        Some(v) => v,
        None => SchemaVersion::detect(&value).ok_or(MigrationError::UnknownVersion)?,
    };

    match version {
        SchemaVersion::V2 => {
            serde_json::from_value(value).map_err(|e| MigrationError::Malformed {
                version,
                message: e.to_string(),
            })
        }
        SchemaVersion::V1 => {
            let legacy: CharacterV1 =
                serde_json::from_value(value).map_err(|e| MigrationError::Malformed {
                    version,
                    message: e.to_string(),
                })?;
            tracing::debug!(id = %legacy.id, "migrating v1 record");
            Ok(migrate_v1(legacy, options))
        }
    }
}

/// Errors from reading records across versions
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("cannot tell which schema version the record uses (no 'characterName' or 'name')")]
    UnknownVersion,

    #[error("record does not match the {version} shape: {message}")]
    Malformed {
        version: SchemaVersion,
        message: String,
    },
}
