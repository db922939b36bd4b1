use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::data::ImageRecord;
use crate::error::{Result, ReviewError};

/// The Catalog holds every reviewable image of the image directory,
/// each paired with the mask it is expected to have.
///
/// Records are sorted by file name so the order is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ImageRecord>,
}

impl Catalog {
    /// Scan `image_dir` and pair each image with its mask in `mask_dir`.
    ///
    /// Both directories must exist; anything else is a startup failure.
    /// An image directory without matching files yields an empty catalog.
    pub fn open(
        image_dir: &Path,
        mask_dir: &Path,
        image_extension: &str,
        mask_extension: &str,
    ) -> Result<Self> {
        ensure_directory(image_dir)?;
        ensure_directory(mask_dir)?;

        let records: Vec<ImageRecord> = list_catalog(image_dir, image_extension)?
            .into_iter()
            .map(|name| ImageRecord {
                stem: file_stem(&name).to_string(),
                source_path: image_dir.join(&name),
                mask_path: resolve_mask_path(mask_dir, &name, mask_extension),
                id: name,
            })
            .collect();

        let with_mask = records
            .iter()
            .filter(|r| r.existing_mask().is_some())
            .count();
        info!(
            "Catalog: {} images in {}, {} with masks",
            records.len(),
            image_dir.display(),
            with_mask
        );

        Ok(Catalog { records })
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    /// Index of the record with the given file name
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

/// Fail with `MissingDirectory` unless `path` is an existing directory
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ReviewError::MissingDirectory(path.to_path_buf()))
    }
}

/// List the file names in `image_dir` with the given extension.
///
/// The match is case-insensitive and non-recursive. Names are sorted
/// lexicographically.
pub fn list_catalog(image_dir: &Path, extension: &str) -> Result<Vec<String>> {
    ensure_directory(image_dir)?;

    let mut names = Vec::new();
    for entry in WalkDir::new(image_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if has_extension(&name, extension) {
            names.push(name);
        } else {
            debug!("Skipping {}", name);
        }
    }

    names.sort();
    Ok(names)
}

/// The file name without its last extension ("a.b.jpg" -> "a.b")
pub fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Where the mask of `image_name` should live. Existence is not checked.
pub fn resolve_mask_path(mask_dir: &Path, image_name: &str, mask_extension: &str) -> PathBuf {
    mask_dir.join(format!("{}.{}", file_stem(image_name), mask_extension))
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
