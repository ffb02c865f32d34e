//! Derivative dimension math and JPEG re-encoding.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// JPEG quality used for all derivatives.
pub const JPEG_QUALITY: u8 = 85;

/// A derivative encoded as JPEG bytes, with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct EncodedDerivative {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Compute output dimensions for a bigger-side bound, preserving aspect ratio.
///
/// Images already within the bound are returned unchanged; there is no
/// upscaling. Non-square images are scaled so their longer side equals the
/// bound, with the shorter side truncated to an integer.
pub fn compute_target_dimensions(
    old_width: u32,
    old_height: u32,
    bound: u32,
) -> MediaResult<(u32, u32)> {
    if old_width == 0 || old_height == 0 {
        return Err(MediaError::invalid_image(format!(
            "degenerate dimensions {}x{}",
            old_width, old_height
        )));
    }

    if old_width <= bound && old_height <= bound {
        return Ok((old_width, old_height));
    }

    if old_width == old_height {
        Ok((bound, bound))
    } else if old_width < old_height {
        // Portrait: the height is the bigger side. Widening division through
        // u64 keeps bound * dimension from overflowing.
        let new_width = (bound as u64 * old_width as u64 / old_height as u64) as u32;
        Ok((new_width, bound))
    } else {
        let new_height = (bound as u64 * old_height as u64 / old_width as u64) as u32;
        Ok((bound, new_height))
    }
}

/// Decode a source image, scale it to the bound, and re-encode as JPEG.
///
/// The source is always re-encoded, even when its dimensions are already within
/// the bound, so every stored derivative is a JPEG regardless of the upload
/// format.
pub fn resize_to_bound(source: &[u8], bound: u32) -> MediaResult<EncodedDerivative> {
    let decoded = image::load_from_memory(source)
        .map_err(|e| MediaError::invalid_image(e.to_string()))?;

    let (old_width, old_height) = (decoded.width(), decoded.height());
    let (width, height) = compute_target_dimensions(old_width, old_height, bound)?;

    let resized = if (width, height) == (old_width, old_height) {
        decoded
    } else {
        debug!(
            "Resizing {}x{} to {}x{} (bound {})",
            old_width, old_height, width, height, bound
        );
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel; flatten to RGB before encoding.
    let rgb = resized.to_rgb8();

    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| MediaError::encode_failed(e.to_string()))?;

    Ok(EncodedDerivative {
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        encoder.encode_image(&img).unwrap();
        bytes
    }

    #[test]
    fn test_within_bound_is_unchanged() {
        assert_eq!(compute_target_dimensions(100, 100, 270).unwrap(), (100, 100));
        assert_eq!(compute_target_dimensions(270, 100, 270).unwrap(), (270, 100));
        assert_eq!(compute_target_dimensions(1, 270, 270).unwrap(), (1, 270));
    }

    #[test]
    fn test_square_above_bound() {
        assert_eq!(compute_target_dimensions(1000, 1000, 270).unwrap(), (270, 270));
        assert_eq!(compute_target_dimensions(801, 801, 800).unwrap(), (800, 800));
    }

    #[test]
    fn test_landscape_truncates() {
        // 1600x1200 at the three default bounds
        assert_eq!(compute_target_dimensions(1600, 1200, 270).unwrap(), (270, 202));
        assert_eq!(compute_target_dimensions(1600, 1200, 500).unwrap(), (500, 375));
        assert_eq!(compute_target_dimensions(1600, 1200, 800).unwrap(), (800, 600));
    }

    #[test]
    fn test_portrait_mirrors_landscape() {
        assert_eq!(compute_target_dimensions(1200, 1600, 270).unwrap(), (202, 270));
        assert_eq!(compute_target_dimensions(1200, 1600, 800).unwrap(), (600, 800));
    }

    #[test]
    fn test_bigger_side_equals_bound() {
        for (w, h) in [(1600, 900), (731, 1024), (5000, 3333)] {
            let (nw, nh) = compute_target_dimensions(w, h, 500).unwrap();
            assert_eq!(nw.max(nh), 500);
        }
    }

    #[test]
    fn test_zero_dimension_is_invalid() {
        assert!(matches!(
            compute_target_dimensions(0, 100, 270),
            Err(MediaError::InvalidImage(_))
        ));
        assert!(matches!(
            compute_target_dimensions(100, 0, 270),
            Err(MediaError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_resize_round_trips_predicted_dimensions() {
        let source = jpeg_fixture(1600, 1200);
        let derivative = resize_to_bound(&source, 270).unwrap();
        assert_eq!((derivative.width, derivative.height), (270, 202));

        let decoded = image::load_from_memory(&derivative.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (270, 202));
    }

    #[test]
    fn test_resize_small_image_passes_through() {
        let source = jpeg_fixture(100, 100);
        let derivative = resize_to_bound(&source, 800).unwrap();
        assert_eq!((derivative.width, derivative.height), (100, 100));

        let decoded = image::load_from_memory(&derivative.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn test_resize_rejects_garbage() {
        let err = resize_to_bound(b"not an image", 270).unwrap_err();
        assert!(matches!(err, MediaError::InvalidImage(_)));
    }
}
