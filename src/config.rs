//! Review settings: built-in defaults, then an optional JSON file, then
//! command-line flags.

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, ReviewError};
use crate::overlay::BlendWeight;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON config file (default: <config dir>/mask-review/config.json if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory containing the source images
    #[arg(short, long, value_name = "DIR")]
    pub images: Option<PathBuf>,

    /// Directory containing the masks
    #[arg(short, long, value_name = "DIR")]
    pub masks: Option<PathBuf>,

    /// CSV file where classifications are saved
    #[arg(short, long, value_name = "FILE")]
    pub ledger: Option<PathBuf>,

    /// Initial mask weight, from 0.0 to 1.0
    #[arg(short, long, value_name = "WEIGHT")]
    pub weight: Option<f32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReviewConfig {
    pub image_dir: PathBuf,
    pub mask_dir: PathBuf,
    pub ledger_path: PathBuf,
    /// Extension of source images, matched case-insensitively
    pub image_extension: String,
    pub mask_extension: String,
    pub default_weight: f32,
    pub weight_step: f32,
    /// Display width of the overlay preview, in logical pixels
    pub preview_width: f32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("data/G1020/Images_Square"),
            mask_dir: PathBuf::from("data/G1020/Masks_RGB"),
            ledger_path: PathBuf::from("classificacoes.csv"),
            image_extension: "jpg".to_string(),
            mask_extension: "png".to_string(),
            default_weight: 0.5,
            weight_step: 0.05,
            preview_width: 600.0,
        }
    }
}

impl ReviewConfig {
    /// Resolve the effective config for a run
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        if let Some(dir) = &args.images {
            config.image_dir = dir.clone();
        }
        if let Some(dir) = &args.masks {
            config.mask_dir = dir.clone();
        }
        if let Some(path) = &args.ledger {
            config.ledger_path = path.clone();
        }
        if let Some(weight) = args.weight {
            config.default_weight = weight;
        }

        // Reject bad values before the window opens
        config.initial_weight()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the path where the config file is looked up by default
    ///
    /// - Linux: ~/.config/mask-review/config.json
    /// - macOS: ~/Library/Application Support/mask-review/config.json
    /// - Windows: %APPDATA%\mask-review\config.json
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("mask-review");
        path.push("config.json");
        Some(path)
    }

    pub fn initial_weight(&self) -> Result<BlendWeight> {
        BlendWeight::new(self.default_weight)
    }

    /// Check the slider step and preview width
    pub fn validate(&self) -> Result<()> {
        if !(self.weight_step > 0.0 && self.weight_step <= 1.0) {
            return Err(ReviewError::InvalidSetting(
                "weight_step",
                "within (0.0, 1.0]",
                self.weight_step,
            ));
        }
        if !(self.preview_width.is_finite() && self.preview_width > 0.0) {
            return Err(ReviewError::InvalidSetting(
                "preview_width",
                "a positive number",
                self.preview_width,
            ));
        }
        Ok(())
    }
}
