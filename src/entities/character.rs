//! Character record types for both schema versions

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeSet;

/// Value of `imagePosition` when a record leaves it out
pub const DEFAULT_IMAGE_POSITION: &str = "center";

fn default_image_position() -> String {
    DEFAULT_IMAGE_POSITION.to_string()
}

/// A skill or defense slot: damage/guard type plus sin attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(rename = "type")]
    pub skill_type: String,
    pub attribute: String,
}

impl Skill {
    pub fn new(skill_type: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            skill_type: skill_type.into(),
            attribute: attribute.into(),
        }
    }

    /// Both halves blank, as produced by migration placeholders
    pub fn is_blank(&self) -> bool {
        self.skill_type.trim().is_empty() && self.attribute.trim().is_empty()
    }
}

/// The three regular skills plus up to three specials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub skill1: Skill,
    pub skill2: Skill,
    pub skill3: Skill,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special1: Option<Skill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special2: Option<Skill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special3: Option<Skill>,
}

impl Skills {
    /// Filled slots keyed by their field name, regular skills first
    pub fn slots(&self) -> impl Iterator<Item = (&'static str, &Skill)> {
        [
            ("skill1", Some(&self.skill1)),
            ("skill2", Some(&self.skill2)),
            ("skill3", Some(&self.skill3)),
            ("special1", self.special1.as_ref()),
            ("special2", self.special2.as_ref()),
            ("special3", self.special3.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, skill)| skill.map(|s| (name, s)))
    }
}

/// A character record in the current (v2) schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Unique identifier, matching the image file stem
    pub id: String,

    pub character_name: String,

    pub identity_name: String,

    /// Whether this is the character's base identity
    pub is_default: bool,

    pub grade: Number,

    pub release_date: String,

    /// CSS object-position for the portrait crop
    #[serde(default = "default_image_position")]
    pub image_position: String,

    /// Order carries no meaning
    pub keywords: Vec<String>,

    pub skills: Skills,

    pub defense: Skill,

    pub affiliation: Vec<String>,

    #[serde(rename = "image_url")]
    pub image_url: String,
}

impl Character {
    /// Label used in pickers and listings: `[identity] character`
    pub fn display_name(&self) -> String {
        format!("[{}] {}", self.identity_name, self.character_name)
    }

    /// Keywords as a set
    pub fn keyword_set(&self) -> BTreeSet<&str> {
        self.keywords.iter().map(|k| k.as_str()).collect()
    }

    /// Compare keywords ignoring order and repeats
    pub fn has_same_keywords(&self, other: &Character) -> bool {
        self.keyword_set() == other.keyword_set()
    }

    /// Drop repeated keywords, keeping the first occurrence
    pub fn dedup_keywords(&mut self) {
        let mut seen = BTreeSet::new();
        self.keywords.retain(|k| seen.insert(k.clone()));
    }
}

/// A character record in the legacy (v1) schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterV1 {
    pub id: String,
    pub name: String,
    pub affiliation: String,
    pub weapon: String,
    pub image_url: String,
}

/// Split a comma-separated affiliation string into trimmed, non-empty names
pub fn split_affiliations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "id": "yisang_01",
            "characterName": "Yi Sang",
            "identityName": "LCB Sinner",
            "isDefault": true,
            "grade": 1,
            "releaseDate": "2023-02-27",
            "keywords": ["Sinking"],
            "skills": {
                "skill1": { "type": "Slash", "attribute": "Gloom" },
                "skill2": { "type": "Pierce", "attribute": "Envy" },
                "skill3": { "type": "Slash", "attribute": "Sloth" }
            },
            "defense": { "type": "Evade", "attribute": "Gloom" },
            "affiliation": ["Limbus Company"],
            "image_url": "/images/characters/yisang_01.png"
        })
    }

    #[test]
    fn test_deserialize_applies_image_position_default() {
        let character: Character = serde_json::from_value(sample()).unwrap();
        assert_eq!(character.image_position, "center");
        assert_eq!(character.display_name(), "[LCB Sinner] Yi Sang");
        let slots: Vec<&str> = character.skills.slots().map(|(name, _)| name).collect();
        assert_eq!(slots, ["skill1", "skill2", "skill3"]);
    }

    #[test]
    fn test_serialize_uses_schema_field_names() {
        let character: Character = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(&character).unwrap();
        assert_eq!(value["characterName"], "Yi Sang");
        assert_eq!(value["image_url"], "/images/characters/yisang_01.png");
        assert_eq!(value["skills"]["skill1"]["type"], "Slash");
        assert_eq!(value["grade"], json!(1));
        assert!(value["skills"].get("special1").is_none());
    }

    #[test]
    fn test_special_without_attribute_is_rejected() {
        let mut value = sample();
        value["skills"]["special1"] = json!({ "type": "Slash" });
        assert!(serde_json::from_value::<Character>(value).is_err());
    }

    #[test]
    fn test_keywords_compare_as_sets() {
        let mut a: Character = serde_json::from_value(sample()).unwrap();
        let mut b = a.clone();
        a.keywords = vec!["Sinking".into(), "Slash".into()];
        b.keywords = vec!["Slash".into(), "Sinking".into(), "Slash".into()];
        assert!(a.has_same_keywords(&b));

        b.dedup_keywords();
        assert_eq!(b.keywords, vec!["Slash", "Sinking"]);
    }

    #[test]
    fn test_split_affiliations() {
        assert_eq!(
            split_affiliations(" Limbus Company, , N Corp "),
            vec!["Limbus Company", "N Corp"]
        );
        assert!(split_affiliations(" , ").is_empty());
    }
}
