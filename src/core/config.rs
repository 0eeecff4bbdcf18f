//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::identity::SchemaVersion;
use crate::core::Project;
use crate::entities::migrate::DEFAULT_AFFILIATION;

/// Where the site keeps character records, relative to the project root
pub const DEFAULT_CONTENT_DIR: &str = "src/content/characters";
/// Where the site keeps character images, relative to the project root
pub const DEFAULT_IMAGE_DIR: &str = "public/images/characters";
/// URL under which the site serves the image directory
pub const DEFAULT_IMAGE_URL_PREFIX: &str = "/images/characters/";

/// Codex configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record directory, relative to the project root
    pub content_dir: Option<PathBuf>,

    /// Image directory, relative to the project root
    pub image_dir: Option<PathBuf>,

    /// Prefix joined with the image filename to form `image_url`
    pub image_url_prefix: Option<String>,

    /// Affiliation written when a record lists none
    pub default_affiliation: Option<String>,

    /// Schema version assumed when a record's version cannot be detected
    pub schema_version: Option<SchemaVersion>,
}

impl Config {
    /// Load configuration for a known project (or none)
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (accessors below)

        // 2. Global user config (~/.config/codex/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.codex/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.codex_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.merge_env();

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        if contents
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'))
        {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    fn merge_env(&mut self) {
        if let Ok(dir) = std::env::var("CODEX_CONTENT_DIR") {
            self.content_dir = Some(PathBuf::from(dir));
        }
        if let Ok(dir) = std::env::var("CODEX_IMAGE_DIR") {
            self.image_dir = Some(PathBuf::from(dir));
        }
        if let Ok(affiliation) = std::env::var("CODEX_DEFAULT_AFFILIATION") {
            self.default_affiliation = Some(affiliation);
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "codex")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.content_dir.is_some() {
            self.content_dir = other.content_dir;
        }
        if other.image_dir.is_some() {
            self.image_dir = other.image_dir;
        }
        if other.image_url_prefix.is_some() {
            self.image_url_prefix = other.image_url_prefix;
        }
        if other.default_affiliation.is_some() {
            self.default_affiliation = other.default_affiliation;
        }
        if other.schema_version.is_some() {
            self.schema_version = other.schema_version;
        }
    }

    pub fn content_dir(&self) -> PathBuf {
        self.content_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR))
    }

    pub fn image_dir(&self) -> PathBuf {
        self.image_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR))
    }

    /// URL prefix, always ending in `/`
    pub fn image_url_prefix(&self) -> String {
        let prefix = self
            .image_url_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_IMAGE_URL_PREFIX.to_string());
        if prefix.ends_with('/') {
            prefix
        } else {
            format!("{}/", prefix)
        }
    }

    pub fn default_affiliation(&self) -> String {
        self.default_affiliation
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AFFILIATION.to_string())
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version.unwrap_or_default()
    }
}
