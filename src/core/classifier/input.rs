//! Classifier input tensor.
//!
//! The model expects a `[1, 128, 128, 3]` NHWC tensor of RGB values
//! scaled to [0, 1]. Images are resized directly to 128x128 with no
//! aspect-ratio preservation, using SIMD-accelerated fast_image_resize.

use crate::error::ClassifierError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::DynamicImage;

/// Preprocessed, batch-of-one model input
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierInput {
    data: Vec<f32>,
}

impl ClassifierInput {
    pub const WIDTH: u32 = 128;
    pub const HEIGHT: u32 = 128;
    pub const CHANNELS: usize = 3;

    /// Tensor shape, NHWC
    pub const SHAPE: [usize; 4] = [1, Self::HEIGHT as usize, Self::WIDTH as usize, Self::CHANNELS];

    /// Convert to RGB, resize to 128x128, scale by 1/255.
    pub fn from_image(image: &DynamicImage) -> Result<Self, ClassifierError> {
        let rgb = image.to_rgb8();
        let (src_width, src_height) = rgb.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(ClassifierError::Preprocess(
                "Invalid source dimensions".to_string(),
            ));
        }

        let src_image = Image::from_vec_u8(src_width, src_height, rgb.into_raw(), PixelType::U8x3)
            .map_err(|e| {
                ClassifierError::Preprocess(format!("Failed to create source image: {}", e))
            })?;

        let mut dst_image = Image::new(Self::WIDTH, Self::HEIGHT, PixelType::U8x3);

        let options =
            ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::CatmullRom));

        Resizer::new()
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| ClassifierError::Preprocess(format!("Resize failed: {}", e)))?;

        Ok(Self::from_rgb_bytes(&dst_image.into_vec()))
    }

    /// Scale already-resized 128x128 RGB bytes
    fn from_rgb_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.iter().map(|&v| v as f32 / 255.0).collect(),
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Little-endian f32 encoding, the wire format for external models
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, Rgba};

    fn element_count() -> usize {
        ClassifierInput::SHAPE.iter().product()
    }

    #[test]
    fn shape_is_batch_of_one() {
        assert_eq!(ClassifierInput::SHAPE, [1, 128, 128, 3]);
    }

    #[test]
    fn resizes_non_square_image_exactly() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(300, 90, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        }));
        let input = ClassifierInput::from_image(&image).unwrap();

        assert_eq!(input.as_slice().len(), element_count());
    }

    #[test]
    fn values_are_scaled_to_unit_range() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |_, _| Rgb([255, 0, 51])));
        let input = ClassifierInput::from_image(&image).unwrap();

        // Allow one quantisation step of resampling error
        let step = 1.0 / 255.0 + 1e-6;
        let first = &input.as_slice()[..3];
        assert!((first[0] - 1.0).abs() <= step);
        assert!(first[1].abs() <= step);
        assert!((first[2] - 0.2).abs() <= step);
        assert!(input.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn grayscale_and_rgba_are_converted_to_rgb() {
        let gray = DynamicImage::ImageLuma8(ImageBuffer::from_fn(10, 10, |_, _| Luma([128u8])));
        let rgba = DynamicImage::ImageRgba8(ImageBuffer::from_fn(10, 10, |_, _| Rgba([1u8, 2, 3, 4])));

        assert_eq!(ClassifierInput::from_image(&gray).unwrap().as_slice().len(), element_count());
        assert_eq!(ClassifierInput::from_image(&rgba).unwrap().as_slice().len(), element_count());
    }

    #[test]
    fn le_bytes_are_four_per_value() {
        let input = ClassifierInput::from_rgb_bytes(&[0, 255]);
        let bytes = input.to_le_bytes();

        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[4..], &1.0f32.to_le_bytes());
    }
}
