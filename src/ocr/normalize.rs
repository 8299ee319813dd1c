//! Image normalization
//!
//! Decodes uploaded bytes and converts them to 8-bit RGB, the only color
//! representation the recognition engine is tuned for.

use image::{DynamicImage, RgbImage};

/// The uploaded bytes are not a decodable image
#[derive(Debug, thiserror::Error)]
pub enum ImageDecodeError {
    #[error("Empty image payload")]
    Empty,

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode `bytes` with format auto-detection and normalize to RGB.
///
/// Grayscale, alpha, 16-bit and float images are converted; alpha is
/// dropped. Nothing else about the image is changed.
pub fn normalize_image(bytes: &[u8]) -> Result<RgbImage, ImageDecodeError> {
    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }

    let decoded = image::load_from_memory(bytes)?;

    let rgb = match decoded {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => {
            tracing::debug!(color = ?other.color(), "Converting image to RGB");
            other.to_rgb8()
        }
    };

    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, ImageFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn test_rgb_png_passes_through() {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let rgb = normalize_image(&bytes).unwrap();
        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_grayscale_is_expanded() {
        let img = GrayImage::from_pixel(2, 2, Luma([200]));
        let bytes = encode(DynamicImage::ImageLuma8(img), ImageFormat::Png);

        let rgb = normalize_image(&bytes).unwrap();
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_alpha_is_dropped() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let rgb = normalize_image(&bytes).unwrap();
        assert_eq!(rgb.get_pixel(0, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_sixteen_bit_grayscale_is_narrowed() {
        let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(2, 2, Luma([u16::MAX]));
        let bytes = encode(DynamicImage::ImageLuma16(img), ImageFormat::Png);

        let rgb = normalize_image(&bytes).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_sixteen_bit_rgb_is_narrowed() {
        let img = ImageBuffer::<Rgb<u16>, Vec<u16>>::from_pixel(3, 2, Rgb([u16::MAX, 0, u16::MAX]));
        let bytes = encode(DynamicImage::ImageRgb16(img), ImageFormat::Png);

        let rgb = normalize_image(&bytes).unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1), &Rgb([255, 0, 255]));
    }

    #[test]
    fn test_other_formats_are_detected() {
        let img = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Bmp);

        assert_eq!(normalize_image(&bytes).unwrap().dimensions(), (3, 3));
    }

    #[test]
    fn test_empty_payload() {
        assert!(matches!(normalize_image(&[]), Err(ImageDecodeError::Empty)));
    }

    #[test]
    fn test_garbage_bytes() {
        let result = normalize_image(b"definitely not an image");
        assert!(matches!(result, Err(ImageDecodeError::Decode(_))));
    }

    #[test]
    fn test_truncated_png() {
        let img = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let result = normalize_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(ImageDecodeError::Decode(_))));
    }
}
