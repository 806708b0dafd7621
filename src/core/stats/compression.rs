//! Flat-block score.
//!
//! Heavy JPEG quantisation and synthetic smoothing both leave 8x8
//! blocks with almost no internal variation.

use super::numeric::{full_blocks, std_dev, GrayPlane};
use super::{FeatureScorer, ScorerKind};
use crate::core::sample::ImageSample;
use crate::error::ScorerFailure;

/// Number of near-uniform 8x8 blocks divided by 50, capped at 1
#[derive(Debug, Clone)]
pub struct CompressionScorer {
    block_size: usize,
    /// Blocks with a standard deviation below this are "flat"
    flatness_threshold: f64,
    /// Flat-block count that saturates the score
    saturation: f64,
}

impl CompressionScorer {
    pub const BLOCK_SIZE: usize = 8;
    pub const FLATNESS_THRESHOLD: f64 = 5.0;
    pub const SATURATION: f64 = 50.0;

    pub fn new() -> Self {
        Self {
            block_size: Self::BLOCK_SIZE,
            flatness_threshold: Self::FLATNESS_THRESHOLD,
            saturation: Self::SATURATION,
        }
    }

    /// Count of complete blocks whose pixel std-dev is under the threshold
    pub fn flat_blocks(&self, gray: &GrayPlane) -> usize {
        full_blocks(gray, self.block_size)
            .filter(|block| {
                std_dev(block).is_some_and(|sd| sd < self.flatness_threshold)
            })
            .count()
    }
}

impl Default for CompressionScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureScorer for CompressionScorer {
    fn score(&self, image: &ImageSample, gray: &GrayPlane) -> Result<f64, ScorerFailure> {
        if gray.is_empty() {
            return Err(ScorerFailure::DegenerateDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        Ok((self.flat_blocks(gray) as f64 / self.saturation).min(1.0))
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Compression
    }
}
