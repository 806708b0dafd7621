//! Edge density score using a Canny detector.
//!
//! Steps:
//! 1. Unnormalised 3x3 Sobel, L1 magnitude `|gx| + |gy|`
//! 2. Non-maximum suppression along the gradient direction,
//!    quantised to 0/45/90/135 degrees
//! 3. Double threshold: above `high` is a strong edge, above `low` a weak one
//! 4. Hysteresis: weak pixels survive only if 8-connected to a strong one
//!
//! No pre-blur is applied, matching the common `Canny(gray, 100, 200)` call.

use super::numeric::{sobel, GrayPlane};
use super::{FeatureScorer, ScorerKind};
use crate::core::sample::ImageSample;
use crate::error::ScorerFailure;

/// tan(22.5°)
const TAN_22_5: f64 = 0.414_213_562_373_095;
/// tan(67.5°)
const TAN_67_5: f64 = 2.414_213_562_373_095;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    None,
    Weak,
    Strong,
}

/// Fraction of pixels on a Canny edge, doubled and capped at 1
#[derive(Debug, Clone)]
pub struct EdgeScorer {
    low: f64,
    high: f64,
}

impl EdgeScorer {
    pub const LOW_THRESHOLD: f64 = 100.0;
    pub const HIGH_THRESHOLD: f64 = 200.0;
    /// Multiplier applied to the edge density
    pub const DENSITY_GAIN: f64 = 2.0;

    #[cfg(test)]
    fn with_thresholds(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Binary edge map, `true` where a pixel is on an edge
    pub fn edge_map(&self, gray: &GrayPlane) -> Vec<bool> {
        let (width, height) = (gray.width(), gray.height());
        let gradients = sobel(gray);
        let magnitude: Vec<f64> = gradients
            .gx
            .iter()
            .zip(&gradients.gy)
            .map(|(&gx, &gy)| (gx.abs() + gy.abs()) as f64)
            .collect();

        // Out-of-bounds neighbours count as zero magnitude
        let mag_at = |x: isize, y: isize| -> f64 {
            if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
                0.0
            } else {
                magnitude[y as usize * width + x as usize]
            }
        };

        let mut states = vec![EdgeState::None; width * height];
        let mut stack = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                let m = magnitude[idx];
                if m <= self.low {
                    continue;
                }

                let gx = gradients.gx[idx];
                let gy = gradients.gy[idx];
                let ax = gx.abs() as f64;
                let ay = gy.abs() as f64;
                let (xi, yi) = (x as isize, y as isize);

                let is_local_max = if ay < ax * TAN_22_5 {
                    m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
                } else if ay > ax * TAN_67_5 {
                    m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
                } else {
                    let s: isize = if (gx < 0) != (gy < 0) { -1 } else { 1 };
                    m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
                };

                if !is_local_max {
                    continue;
                }

                if m > self.high {
                    states[idx] = EdgeState::Strong;
                    stack.push(idx);
                } else {
                    states[idx] = EdgeState::Weak;
                }
            }
        }

        // Promote weak pixels reachable from strong ones
        while let Some(idx) = stack.pop() {
            let (x, y) = ((idx % width) as isize, (idx / width) as isize);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    let n = ny as usize * width + nx as usize;
                    if states[n] == EdgeState::Weak {
                        states[n] = EdgeState::Strong;
                        stack.push(n);
                    }
                }
            }
        }

        states.into_iter().map(|s| s == EdgeState::Strong).collect()
    }
}

impl Default for EdgeScorer {
    fn default() -> Self {
        Self {
            low: Self::LOW_THRESHOLD,
            high: Self::HIGH_THRESHOLD,
        }
    }
}

impl FeatureScorer for EdgeScorer {
    fn score(&self, image: &ImageSample, gray: &GrayPlane) -> Result<f64, ScorerFailure> {
        if gray.is_empty() {
            return Err(ScorerFailure::DegenerateDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        let edges = self.edge_map(gray);
        let edge_pixels = edges.iter().filter(|&&e| e).count();
        let density = edge_pixels as f64 / edges.len() as f64;

        Ok((density * Self::DENSITY_GAIN).min(1.0))
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::test_images::{gray, noise};

    fn score(image: &ImageSample) -> f64 {
        EdgeScorer::default()
            .score(image, &GrayPlane::from_sample(image))
            .unwrap()
    }

    #[test]
    fn flat_image_has_no_edges() {
        assert_eq!(score(&gray(40, 40, |_, _| 200)), 0.0);
    }

    #[test]
    fn vertical_step_yields_one_pixel_wide_edge() {
        let image = gray(64, 64, |x, _| if x >= 32 { 255 } else { 0 });
        let edges = EdgeScorer::default().edge_map(&GrayPlane::from_sample(&image));

        // Non-maximum suppression keeps exactly one of the two tied columns
        let columns: Vec<usize> = (0..64).filter(|&x| edges[x]).collect();
        assert_eq!(columns, vec![31]);
        assert_eq!(edges.iter().filter(|&&e| e).count(), 64);

        // 64 / 4096 pixels, doubled
        assert!((score(&image) - 0.031_25).abs() < 1e-12);
    }

    #[test]
    fn faint_step_is_below_thresholds() {
        // 10 levels of contrast gives magnitude 40, under the low threshold
        let image = gray(32, 32, |x, _| if x >= 16 { 110 } else { 100 });
        assert_eq!(score(&image), 0.0);
    }

    #[test]
    fn weak_edges_need_a_strong_neighbour() {
        // Magnitude 4 * 40 = 160: weak everywhere, nothing strong to anchor it
        let image = gray(32, 32, |x, _| if x >= 16 { 140 } else { 100 });
        assert_eq!(score(&image), 0.0);

        // Lowering the high threshold turns the same edge strong
        let scorer = EdgeScorer::with_thresholds(100.0, 150.0);
        let value = scorer.score(&image, &GrayPlane::from_sample(&image)).unwrap();
        assert!(value > 0.0);
    }

    #[test]
    fn dense_noise_is_capped() {
        let value = score(&noise(64, 64, 3));
        assert!(value > 0.0 && value <= 1.0);
    }
}
