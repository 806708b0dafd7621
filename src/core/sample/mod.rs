//! # Sample Module
//!
//! Turns uploaded bytes into an immutable pixel grid the scorers can read.
//!
//! ## Pipeline
//! 1. Read the upload (`input`) - memory-mapped for large files
//! 2. Sniff the format from magic bytes
//! 3. Decode (`decode`) - zune-jpeg for JPEG, image crate otherwise
//! 4. Normalise to 1 (luma) or 3 (RGB) channels as an [`ImageSample`]

pub mod decode;
pub mod input;

pub use decode::{decode_bytes, ImageFormat};
pub use input::{read_file_bytes, validate_image_header, FileBytes};

use crate::error::DecodeError;
use image::DynamicImage;

/// A decoded image: row-major, channel-interleaved 8-bit pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl ImageSample {
    /// Create a sample from raw interleaved pixels.
    ///
    /// Zero-sized samples are accepted so that scorers can report the
    /// degenerate dimensions themselves.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self, DecodeError> {
        if channels != 1 && channels != 3 {
            return Err(DecodeError::UnsupportedChannels { channels });
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(DecodeError::BufferMismatch {
                width,
                height,
                channels,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Build a sample from a decoded image, dropping any alpha channel.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let (data, channels) = match image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => (image.to_luma8().into_raw(), 1),
            _ => (image.to_rgb8().into_raw(), 3),
        };

        Self {
            data,
            width: image.width(),
            height: image.height(),
            channels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 1 for grayscale, 3 for RGB
    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels (not bytes)
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    pub fn is_rgb(&self) -> bool {
        self.channels == 3
    }
}
