use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("File not found: {}", .0.display())]
    MissingMask(PathBuf),

    #[error("Unsupported mask channel layout: {0} channel(s)")]
    UnsupportedChannelLayout(u8),

    #[error("Cannot resize mask of {0}x{1} to {2}x{3}")]
    DimensionMismatch(u32, u32, u32, u32),

    #[error("Blend weight must be within [0.0, 1.0], got {0}")]
    InvalidBlendWeight(f32),

    #[error("Config value {0} must be {1}, got {2}")]
    InvalidSetting(&'static str, &'static str, f32),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Ledger error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
