//! High-frequency noise score.
//!
//! Camera sensors leave irregular, content-dependent noise; generators
//! tend to produce a more uniform high-frequency texture. The spread of
//! Sobel gradient magnitudes over the whole image is a cheap proxy.

use super::numeric::{sobel, std_dev, GrayPlane};
use super::{FeatureScorer, ScorerKind};
use crate::core::sample::ImageSample;
use crate::error::ScorerFailure;

/// Standard deviation of normalised Sobel magnitudes, divided by 50
#[derive(Debug, Clone)]
pub struct NoiseScorer {
    /// Divisor mapping the standard deviation onto [0, 1]
    normalizer: f64,
}

impl NoiseScorer {
    pub const NORMALIZER: f64 = 50.0;

    pub fn new() -> Self {
        Self {
            normalizer: Self::NORMALIZER,
        }
    }
}

impl Default for NoiseScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureScorer for NoiseScorer {
    fn score(&self, image: &ImageSample, gray: &GrayPlane) -> Result<f64, ScorerFailure> {
        if gray.is_empty() {
            return Err(ScorerFailure::DegenerateDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        let gradients = sobel(gray);

        // Kernels scaled by 1/4, magnitude averaged over both axes
        let magnitudes: Vec<f64> = gradients
            .gx
            .iter()
            .zip(&gradients.gy)
            .map(|(&gx, &gy)| {
                let gx = gx as f64 / 4.0;
                let gy = gy as f64 / 4.0;
                ((gx * gx + gy * gy) / 2.0).sqrt()
            })
            .collect();

        let spread = std_dev(&magnitudes).ok_or_else(|| ScorerFailure::NumericDegeneracy {
            reason: "no gradient samples".to_string(),
        })?;

        Ok((spread / self.normalizer).min(1.0))
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Noise
    }
}
