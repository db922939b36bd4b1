//! Mask-over-image compositing.
//!
//! A mask of any supported layout is normalized to the source image
//! (3 channels, same size, 8-bit) and then added on top of it:
//! `out = saturate(image + mask * weight)`. The blend is additive rather
//! than convex, so bright mask regions saturate towards white at high
//! weights.
//!
//! Colour masks are added with their first and third channels swapped, so a
//! mask's red lands on the image's blue. Overlays therefore look the same
//! as the ones produced by the earlier OpenCV-based review tool, which kept
//! masks in B,G,R order and the source in R,G,B order.

use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel, Rgb, Rgb32FImage, RgbImage};

use crate::error::{Result, ReviewError};

/// Mask opacity in the composite, within [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeight(f32);

impl BlendWeight {
    pub fn new(value: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReviewError::InvalidBlendWeight(value))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for BlendWeight {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Blend `mask` over `image` at the given weight.
///
/// The result always has the image's dimensions and 3 channels.
pub fn composite(image: &RgbImage, mask: &DynamicImage, weight: BlendWeight) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    let mask = normalize_mask(mask, width, height)?;
    blend(image, &swap_red_blue(mask), weight)
}

/// Bring a mask to 3 channels, `width` x `height`, 8-bit
pub fn normalize_mask(mask: &DynamicImage, width: u32, height: u32) -> Result<RgbImage> {
    let rgb = normalize_channels(mask)?;
    let resized = resize_nearest(&rgb, width, height)?;
    Ok(quantize(&resized))
}

/// Convert a 1, 3 or 4 channel mask to 3 channels.
///
/// Gray is copied into every channel, a 4th channel is dropped. Sample
/// values keep their decoded magnitude (a 16-bit sample stays above 255
/// until `quantize`).
pub fn normalize_channels(mask: &DynamicImage) -> Result<Rgb32FImage> {
    let (width, height) = mask.dimensions();
    let channels = mask.color().channel_count();

    let samples = match mask {
        DynamicImage::ImageLuma8(buffer) => widen(buffer),
        DynamicImage::ImageRgb8(buffer) => widen(buffer),
        DynamicImage::ImageRgba8(buffer) => widen(buffer),
        DynamicImage::ImageLuma16(buffer) => widen(buffer),
        DynamicImage::ImageRgb16(buffer) => widen(buffer),
        DynamicImage::ImageRgba16(buffer) => widen(buffer),
        DynamicImage::ImageRgb32F(buffer) => widen(buffer),
        DynamicImage::ImageRgba32F(buffer) => widen(buffer),
        _ => return Err(ReviewError::UnsupportedChannelLayout(channels)),
    };

    let rgb: Vec<f32> = match channels {
        1 => samples.iter().flat_map(|&v| [v, v, v]).collect(),
        3 => samples,
        4 => samples
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect(),
        n => return Err(ReviewError::UnsupportedChannelLayout(n)),
    };

    ImageBuffer::from_raw(width, height, rgb)
        .ok_or(ReviewError::DimensionMismatch(width, height, width, height))
}

/// Nearest-neighbour resize.
///
/// Destination `x` samples source `floor(x * src_w / dst_w)`, so class
/// labels are never interpolated into values that are not in the mask.
pub fn resize_nearest(source: &Rgb32FImage, width: u32, height: u32) -> Result<Rgb32FImage> {
    let (src_width, src_height) = source.dimensions();
    if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
        return Err(ReviewError::DimensionMismatch(
            src_width, src_height, width, height,
        ));
    }

    if (src_width, src_height) == (width, height) {
        return Ok(source.clone());
    }

    let columns: Vec<u32> = (0..width)
        .map(|x| nearest_source(x, src_width, width))
        .collect();
    let rows: Vec<u32> = (0..height)
        .map(|y| nearest_source(y, src_height, height))
        .collect();

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        *source.get_pixel(columns[x as usize], rows[y as usize])
    }))
}

/// Clamp every sample to [0, 255] and truncate to `u8`
pub fn quantize(source: &Rgb32FImage) -> RgbImage {
    ImageBuffer::from_fn(source.width(), source.height(), |x, y| {
        Rgb(source.get_pixel(x, y).0.map(|v| v.clamp(0.0, 255.0) as u8))
    })
}

/// `saturate(image + mask * weight)` per channel; both rasters must match in size
pub fn blend(image: &RgbImage, mask: &RgbImage, weight: BlendWeight) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if mask.dimensions() != (width, height) {
        let (mask_width, mask_height) = mask.dimensions();
        return Err(ReviewError::DimensionMismatch(
            mask_width, mask_height, width, height,
        ));
    }

    let weight = weight.value();
    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        let base = image.get_pixel(x, y).0;
        let over = mask.get_pixel(x, y).0;
        Rgb([0, 1, 2].map(|c| saturate(f32::from(base[c]) + f32::from(over[c]) * weight)))
    }))
}

/// Reverse each pixel's channel order; gray masks come out unchanged
pub fn swap_red_blue(mut mask: RgbImage) -> RgbImage {
    for pixel in mask.pixels_mut() {
        pixel.0.swap(0, 2);
    }
    mask
}

fn saturate(value: f32) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

fn nearest_source(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let scale = 1.0 / (f64::from(dst_len) / f64::from(src_len));
    ((f64::from(dst) * scale).floor() as u32).min(src_len - 1)
}

fn widen<P>(buffer: &ImageBuffer<P, Vec<P::Subpixel>>) -> Vec<f32>
where
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    buffer.as_raw().iter().map(|&v| Into::<f32>::into(v)).collect()
}
