/// Overlay rendering module
///
/// This module handles:
/// - Decoding source images and masks (loader.rs)
/// - Normalizing masks and blending them over the image (compositor.rs)
pub mod compositor;
pub mod loader;

pub use compositor::BlendWeight;
pub use loader::render;
