use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::path::Path;
use tracing::debug;

use super::compositor::{composite, BlendWeight};
use crate::error::{Result, ReviewError};
use crate::state::data::ImageRecord;

/// Decode a source image as 8-bit RGB, upright according to its EXIF
/// orientation tag
pub fn load_source(path: &Path) -> Result<RgbImage> {
    let mut decoder = ImageReader::open(path)?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image.to_rgb8())
}

/// Decode a mask as stored: channel count and bit depth are kept, and any
/// orientation tag is ignored
pub fn load_mask(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Load the record's image and mask and blend them.
///
/// # Returns
/// * `Ok(overlay)` - the composite, sized like the source image
/// * `Err(MissingMask)` - the expected mask file is not on disk
/// * `Err(_)` - decode or compositing failure for this image only
pub fn render(record: &ImageRecord, weight: BlendWeight) -> Result<RgbImage> {
    let mask_path = record
        .existing_mask()
        .ok_or_else(|| ReviewError::MissingMask(record.mask_path.clone()))?;

    let image = load_source(&record.source_path)?;
    let mask = load_mask(mask_path)?;

    debug!(
        "Compositing {} ({}x{}) with {:?} mask ({}x{}) at {:.2}",
        record.id,
        image.width(),
        image.height(),
        mask.color(),
        mask.width(),
        mask.height(),
        weight.value()
    );

    composite(&image, &mask, weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::catalog::Catalog;
    use image::codecs::jpeg::JpegEncoder;
    use image::{GrayImage, ImageBuffer, Luma, LumaA, Rgb};

    /// APP1 segment holding a big-endian TIFF block with a single
    /// Orientation entry
    fn exif_orientation_segment(orientation: u8) -> Vec<u8> {
        let mut segment = vec![0xFF, 0xE1, 0x00, 0x22];
        segment.extend_from_slice(b"Exif\0\0");
        segment.extend_from_slice(&[0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
        segment.extend_from_slice(&[0x00, 0x01]);
        segment.extend_from_slice(&[
            0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, orientation, 0x00, 0x00,
        ]);
        segment.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        segment
    }

    fn write_jpeg(path: &Path, image: &RgbImage, orientation: Option<u8>) {
        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, 95)
            .encode_image(image)
            .unwrap();
        if let Some(orientation) = orientation {
            // Right after the SOI marker
            let rest = encoded.split_off(2);
            encoded.extend(exif_orientation_segment(orientation));
            encoded.extend(rest);
        }
        std::fs::write(path, encoded).unwrap();
    }

    fn fixture() -> (tempfile::TempDir, tempfile::TempDir) {
        let images = tempfile::tempdir().unwrap();
        let masks = tempfile::tempdir().unwrap();

        let black = RgbImage::new(16, 12);
        black.save(images.path().join("a.jpg")).unwrap();
        black.save(images.path().join("b.jpg")).unwrap();

        GrayImage::from_pixel(4, 4, Luma([255]))
            .save(masks.path().join("a.png"))
            .unwrap();

        (images, masks)
    }

    #[test]
    fn test_render_scenario() {
        let (images, masks) = fixture();
        let catalog = Catalog::open(images.path(), masks.path(), "jpg", "png").unwrap();
        let ids: Vec<&str> = catalog.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.jpg", "b.jpg"]);

        let weight = BlendWeight::new(0.5).unwrap();

        let missing = render(catalog.get(1).unwrap(), weight);
        assert!(
            matches!(missing, Err(ReviewError::MissingMask(ref p)) if p == &masks.path().join("b.png"))
        );

        let source = load_source(&images.path().join("a.jpg")).unwrap();
        let overlay = render(catalog.get(0).unwrap(), weight).unwrap();
        assert_eq!(overlay.dimensions(), (16, 12));
        for (out, src) in overlay.pixels().zip(source.pixels()) {
            for c in 0..3 {
                // 255 * 0.5 on top of the decoded source, ties to even
                let expected = (f32::from(src.0[c]) + 127.5).round_ties_even().min(255.0) as u8;
                assert_eq!(out.0[c], expected);
            }
        }
    }

    #[test]
    fn test_source_is_turned_upright() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::new(8, 4);
        let rotated = dir.path().join("rotated.jpg");
        let plain = dir.path().join("plain.jpg");
        // 6 = stored image must be rotated 90 degrees clockwise
        write_jpeg(&rotated, &image, Some(6));
        write_jpeg(&plain, &image, None);

        assert_eq!(load_source(&rotated).unwrap().dimensions(), (4, 8));
        assert_eq!(load_source(&plain).unwrap().dimensions(), (8, 4));
    }

    #[test]
    fn test_rotated_source_sizes_the_overlay() {
        let images = tempfile::tempdir().unwrap();
        let masks = tempfile::tempdir().unwrap();
        write_jpeg(&images.path().join("a.jpg"), &RgbImage::new(8, 4), Some(6));
        GrayImage::from_pixel(2, 2, Luma([255]))
            .save(masks.path().join("a.png"))
            .unwrap();
        let catalog = Catalog::open(images.path(), masks.path(), "jpg", "png").unwrap();

        let overlay = render(catalog.get(0).unwrap(), BlendWeight::default()).unwrap();

        assert_eq!(overlay.dimensions(), (4, 8));
    }

    #[test]
    fn test_colour_mask_is_blended_in_reversed_order() {
        let images = tempfile::tempdir().unwrap();
        let masks = tempfile::tempdir().unwrap();
        RgbImage::new(4, 4).save(images.path().join("a.jpg")).unwrap();
        RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]))
            .save(masks.path().join("a.png"))
            .unwrap();
        let catalog = Catalog::open(images.path(), masks.path(), "jpg", "png").unwrap();

        let source = load_source(&images.path().join("a.jpg")).unwrap();
        let overlay = render(catalog.get(0).unwrap(), BlendWeight::new(1.0).unwrap()).unwrap();

        for (out, src) in overlay.pixels().zip(source.pixels()) {
            assert_eq!(out.0, [src.0[0], src.0[1], 255]);
        }
    }

    #[test]
    fn test_mask_keeps_its_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.png");
        ImageBuffer::from_pixel(3, 2, LumaA([10u8, 255]))
            .save(&path)
            .unwrap();

        let mask = load_mask(&path).unwrap();

        assert_eq!(mask.color().channel_count(), 2);
    }

    #[test]
    fn test_unsupported_mask_is_reported_per_image() {
        let (images, masks) = fixture();
        ImageBuffer::from_pixel(3, 2, LumaA([10u8, 255]))
            .save(masks.path().join("b.png"))
            .unwrap();
        let catalog = Catalog::open(images.path(), masks.path(), "jpg", "png").unwrap();

        let result = render(catalog.get(1).unwrap(), BlendWeight::default());

        assert!(matches!(
            result,
            Err(ReviewError::UnsupportedChannelLayout(2))
        ));
    }
}
