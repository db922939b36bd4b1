use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::data::{ClassificationEntry, Label};
use crate::error::Result;

/// Column names of the ledger file, in order
const HEADERS: [&str; 2] = ["Imagem", "Classificacao"];

/// The ReviewLedger persists one judgment per image in a two-column CSV file.
///
/// Every write rewrites the whole file (last write wins, no locking).
/// Reads always go to disk so the listing reflects the latest write.
pub struct ReviewLedger {
    path: PathBuf,
}

impl ReviewLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `label` for `image_id`, replacing any previous judgment.
    ///
    /// The replaced entry is removed and the new one appended at the end.
    pub fn classify(&self, image_id: &str, label: Label) -> Result<()> {
        let mut entries = self.list_all();
        entries.retain(|e| e.image != image_id);
        entries.push(ClassificationEntry::new(image_id, label));

        self.write_all(&entries)?;

        info!(
            "Saved '{}' for {} ({} entries in {})",
            label,
            image_id,
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// All entries currently on disk, in file order.
    ///
    /// A missing or unreadable file reads as an empty ledger; unreadable
    /// rows are left out.
    pub fn list_all(&self) -> Vec<ClassificationEntry> {
        if !self.path.exists() {
            debug!("No ledger at {}", self.path.display());
            return Vec::new();
        }

        match self.read_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Ignoring unreadable ledger {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// The current judgment for one image, if any
    pub fn label_for(&self, image_id: &str) -> Option<Label> {
        self.list_all()
            .into_iter()
            .find(|e| e.image == image_id)
            .map(|e| e.label)
    }

    /// Rows that do not hold an image name and a known label are skipped
    fn read_all(&self) -> Result<Vec<ClassificationEntry>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = Vec::new();

        for row in reader.deserialize::<ClassificationEntry>() {
            match row {
                Ok(entry) => entries.push(entry),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    warn!(
                        "Skipping ledger row {} in {}: {}",
                        line,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(entries)
    }

    fn write_all(&self, entries: &[ClassificationEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Written next to the ledger, then renamed over it
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp_path)?;
            writer.write_record(HEADERS)?;
            for entry in entries {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl std::fmt::Debug for ReviewLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewLedger")
            .field("path", &self.path)
            .finish()
    }
}
