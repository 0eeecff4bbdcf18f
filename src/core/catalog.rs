//! Image/record pairing for the character catalog
//!
//! Every character image should have exactly one record whose id is the
//! image's file stem. The catalog answers which images still need a record,
//! which records lost their image, and which images are byte-identical.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::identity::record_id_from_path;
use crate::core::loader::record_files;
use crate::core::project::Project;

/// Image extensions the catalog recognises (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Progress through the image set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatus {
    pub total_images: usize,
    pub with_records: usize,
    /// Index of the first image without a record, or `total_images` when done
    pub resume_index: usize,
    pub orphan_records: usize,
}

impl CatalogStatus {
    pub fn pending(&self) -> usize {
        self.total_images - self.with_records
    }

    pub fn is_complete(&self) -> bool {
        self.with_records == self.total_images
    }
}

/// An image still waiting for its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    /// Position in sorted image order
    pub index: usize,
    pub id: String,
    pub path: PathBuf,
}

/// Images sharing one content hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash: String,
    /// The copy that stays: the catalog image, or the first in sorted order
    pub original: PathBuf,
    pub duplicates: Vec<PathBuf>,
}

/// What `remove` deleted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removed {
    pub images: Vec<PathBuf>,
    pub record: Option<PathBuf>,
}

/// View over a records directory and its images directory
#[derive(Debug, Clone)]
pub struct Catalog {
    records_dir: PathBuf,
    images_dir: PathBuf,
}

impl Catalog {
    pub fn new(records_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn for_project(project: &Project, config: &Config) -> Self {
        Self::new(project.records_dir(config), project.images_dir(config))
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Image files, sorted by file name
    pub fn images(&self) -> Result<Vec<PathBuf>, CatalogError> {
        image_files(&self.images_dir)
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.records_dir.join(format!("{}.json", id))
    }

    pub fn has_record(&self, id: &str) -> bool {
        self.record_path(id).is_file()
    }

    pub fn status(&self) -> Result<CatalogStatus, CatalogError> {
        let images = self.images()?;
        let mut with_records = 0;
        let mut resume_index = None;

        for (index, image) in images.iter().enumerate() {
            let Some(id) = record_id_from_path(image) else {
                continue;
            };
            if self.has_record(&id) {
                with_records += 1;
            } else if resume_index.is_none() {
                resume_index = Some(index);
            }
        }

        Ok(CatalogStatus {
            total_images: images.len(),
            with_records,
            resume_index: resume_index.unwrap_or(images.len()),
            orphan_records: self.orphans()?.len(),
        })
    }

    /// The first image, in sorted order, that has no record
    pub fn next_pending(&self) -> Result<Option<PendingImage>, CatalogError> {
        for (index, path) in self.images()?.into_iter().enumerate() {
            let Some(id) = record_id_from_path(&path) else {
                continue;
            };
            if !self.has_record(&id) {
                return Ok(Some(PendingImage { index, id, path }));
            }
        }
        Ok(None)
    }

    /// Record files whose id matches no image
    pub fn orphans(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let image_ids: HashSet<String> = self
            .images()?
            .iter()
            .filter_map(|p| record_id_from_path(p))
            .collect();

        Ok(record_files(&self.records_dir)
            .into_iter()
            .filter(|p| record_id_from_path(p).map_or(false, |id| !image_ids.contains(&id)))
            .collect())
    }

    /// Delete orphan records, returning their ids
    pub fn cleanup(&self, dry_run: bool) -> Result<Vec<String>, CatalogError> {
        let mut removed = Vec::new();

        for path in self.orphans()? {
            if !dry_run {
                fs::remove_file(&path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(path = %path.display(), "removed orphan record");
            }
            if let Some(id) = record_id_from_path(&path) {
                removed.push(id);
            }
        }

        Ok(removed)
    }

    /// Find byte-identical images.
    ///
    /// With `candidates`, each candidate image is compared against the
    /// catalog images (and earlier candidates). Without it, the catalog
    /// images are compared against each other.
    pub fn duplicates(&self, candidates: Option<&Path>) -> Result<Vec<DuplicateGroup>, CatalogError> {
        let mut groups: BTreeMap<String, DuplicateGroup> = BTreeMap::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        let catalog_images = self.images()?;
        let scanned = match candidates {
            Some(dir) => {
                for image in &catalog_images {
                    seen.entry(hash_file(image)?).or_insert_with(|| image.clone());
                }
                image_files(dir)?
            }
            None => catalog_images,
        };

        for image in scanned {
            let hash = hash_file(&image)?;
            match seen.get(&hash) {
                Some(original) => {
                    groups
                        .entry(hash.clone())
                        .or_insert_with(|| DuplicateGroup {
                            hash: hash.clone(),
                            original: original.clone(),
                            duplicates: Vec::new(),
                        })
                        .duplicates
                        .push(image);
                }
                None => {
                    seen.insert(hash, image);
                }
            }
        }

        Ok(groups.into_values().collect())
    }

    /// Delete an image (any recognised extension) and its record
    pub fn remove(&self, id: &str) -> Result<Removed, CatalogError> {
        check_id(id)?;
        let mut removed = Removed::default();

        for image in self.images()? {
            if record_id_from_path(&image).as_deref() == Some(id) {
                fs::remove_file(&image).map_err(|source| CatalogError::Io {
                    path: image.clone(),
                    source,
                })?;
                removed.images.push(image);
            }
        }

        let record = self.record_path(id);
        if record.is_file() {
            fs::remove_file(&record).map_err(|source| CatalogError::Io {
                path: record.clone(),
                source,
            })?;
            removed.record = Some(record);
        }

        if removed.images.is_empty() && removed.record.is_none() {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Ok(removed)
    }
}

/// An id must name a single file inside the catalog directories
fn check_id(id: &str) -> Result<(), CatalogError> {
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !id.contains(['/', '\\']) => Ok(()),
        _ => Err(CatalogError::InvalidId(id.to_string())),
    }
}

/// Whether a path has one of the image extensions
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map_or(false, |e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Image files directly inside `dir`, sorted by file name
pub fn image_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// SHA-256 of a file's contents, lowercase hex
pub fn hash_file(path: &Path) -> Result<String, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Errors from catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no image or record with id '{0}'")]
    NotFound(String),

    #[error("invalid id '{0}': ids are file stems without path separators")]
    InvalidId(String),
}
