//! Inter-channel correlation score.
//!
//! In photographs the red, green and blue channels move together
//! strongly. Weak correlation raises the score.

use super::numeric::{pearson, GrayPlane};
use super::{FeatureScorer, ScorerKind};
use crate::core::sample::ImageSample;
use crate::error::ScorerFailure;

/// `max(0, 1 - mean(|r(R,G)|, |r(R,B)|, |r(G,B)|))`
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorScorer;

impl FeatureScorer for ColorScorer {
    fn score(&self, image: &ImageSample, _gray: &GrayPlane) -> Result<f64, ScorerFailure> {
        if !image.is_rgb() {
            return Err(ScorerFailure::UnsupportedChannelLayout {
                channels: image.channels(),
            });
        }
        if image.is_empty() {
            return Err(ScorerFailure::DegenerateDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        let mut channels: [Vec<f64>; 3] = Default::default();
        for channel in channels.iter_mut() {
            channel.reserve(image.pixel_count());
        }
        for px in image.as_raw().chunks_exact(3) {
            for (channel, &value) in channels.iter_mut().zip(px) {
                channel.push(value as f64);
            }
        }
        let (red, green, blue) = (&channels[0][..], &channels[1][..], &channels[2][..]);

        let correlation = |a: &[f64], b: &[f64], pair: &str| {
            pearson(a, b)
                .map(f64::abs)
                .ok_or_else(|| ScorerFailure::NumericDegeneracy {
                    reason: format!("{} correlation undefined (constant channel)", pair),
                })
        };

        let average = (correlation(red, green, "R-G")?
            + correlation(red, blue, "R-B")?
            + correlation(green, blue, "G-B")?)
            / 3.0;

        Ok((1.0 - average).max(0.0))
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Color
    }
}
