/// UI helpers shared by the review window
///
/// - `ledger_table.rs` - the ledger listing under the preview
pub mod ledger_table;

use iced::widget::image::Handle;
use iced::Color;
use image::{DynamicImage, RgbImage};

/// Wrap a composite into an image handle the renderer can upload
pub fn overlay_handle(overlay: RgbImage) -> Handle {
    let (width, height) = overlay.dimensions();
    let rgba = DynamicImage::ImageRgb8(overlay).into_rgba8();
    Handle::from_rgba(width, height, rgba.into_raw())
}

pub fn success_color() -> Color {
    Color::from_rgb(0.35, 0.8, 0.45)
}

pub fn warning_color() -> Color {
    Color::from_rgb(0.95, 0.75, 0.25)
}

pub fn error_color() -> Color {
    Color::from_rgb(0.95, 0.35, 0.35)
}
