//! Shared data structures for the review state
//!
//! These structs represent the data model that flows between
//! the catalog, the ledger and the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single reviewable image discovered in the image directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// File name only (e.g., "img_01.jpg"), also the ledger key
    pub id: String,
    /// File name without its extension (e.g., "img_01")
    pub stem: String,
    /// Full path to the source image
    pub source_path: PathBuf,
    /// Where the mask is expected to be; may not exist
    pub mask_path: PathBuf,
}

impl ImageRecord {
    /// The mask path, only if the file is currently on disk
    pub fn existing_mask(&self) -> Option<&Path> {
        self.mask_path
            .is_file()
            .then_some(self.mask_path.as_path())
    }
}

// Pick lists render records by their file name
impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Reviewer judgment for one image
///
/// Persisted with the ledger's historical vocabulary ("Boa" / "Ruim").
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    #[serde(rename = "Boa")]
    Accepted,
    #[serde(rename = "Ruim")]
    Rejected,
}

impl Label {
    /// The value written to the ledger file
    pub const fn as_str(self) -> &'static str {
        match self {
            Label::Accepted => "Boa",
            Label::Rejected => "Ruim",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the review ledger
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClassificationEntry {
    #[serde(rename = "Imagem")]
    pub image: String,
    #[serde(rename = "Classificacao")]
    pub label: Label,
}

impl ClassificationEntry {
    pub fn new(image: impl Into<String>, label: Label) -> Self {
        Self {
            image: image.into(),
            label,
        }
    }
}
