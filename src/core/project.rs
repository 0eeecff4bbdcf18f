//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;

/// Directory marking the site root
pub const CODEX_DIR: &str = ".codex";

/// Represents a site using the codex tooling
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .codex/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(CODEX_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found project");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open an explicit root, or discover one from the current directory
    pub fn open(root: Option<&Path>) -> Result<Self, ProjectError> {
        match root {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(CODEX_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Initialize even if .codex/ exists; the config file is rewritten
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let codex_dir = root.join(CODEX_DIR);

        std::fs::create_dir_all(&codex_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(codex_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let project = Self { root };
        let config = Config::default();
        for dir in [project.records_dir(&config), project.images_dir(&config)] {
            std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Character Codex configuration

# Record directory, relative to the project root
# content_dir: src/content/characters

# Image directory, relative to the project root
# image_dir: public/images/characters

# Prefix for image_url values
# image_url_prefix: /images/characters/

# Affiliation written when a record lists none
# default_affiliation: ""

# Version assumed for records whose version cannot be detected (v1, v2)
# schema_version: v2
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .codex configuration directory
    pub fn codex_dir(&self) -> PathBuf {
        self.root.join(CODEX_DIR)
    }

    /// Directory holding one JSON file per record
    pub fn records_dir(&self, config: &Config) -> PathBuf {
        self.root.join(config.content_dir())
    }

    /// Directory holding character images
    pub fn images_dir(&self, config: &Config) -> PathBuf {
        self.root.join(config.image_dir())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a codex project (searched from {searched_from:?}). Run 'codex init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("codex project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
