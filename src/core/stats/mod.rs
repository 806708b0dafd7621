//! # Statistical Analysis Module
//!
//! Pixel-level heuristics that hint at synthetic generation.
//!
//! ## Scorers
//! - **Noise** - spread of Sobel gradient magnitudes
//! - **Edge** - density of Canny edges
//! - **Color** - weakness of inter-channel correlation
//! - **Compression** - count of suspiciously flat 8x8 blocks
//!
//! Every score lies in [0, 1]. A scorer that cannot run on an image
//! falls back to a neutral 0.5 and records why, so callers can tell
//! degraded analysis apart from genuinely neutral evidence.
//!
//! ## Example
//! ```rust,ignore
//! let extractor = StatisticalFeatureExtractor::new();
//! let scores = extractor.extract(&sample);
//! println!("hybrid = {:.3}", scores.hybrid);
//! ```

mod color;
mod compression;
mod edge;
mod noise;
pub mod numeric;

pub use color::ColorScorer;
pub use compression::CompressionScorer;
pub use edge::EdgeScorer;
pub use noise::NoiseScorer;

use crate::core::sample::ImageSample;
use crate::error::ScorerFailure;
use numeric::GrayPlane;
use serde::{Deserialize, Serialize};

/// Which heuristic produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Noise,
    Edge,
    Color,
    Compression,
}

impl std::fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScorerKind::Noise => write!(f, "noise"),
            ScorerKind::Edge => write!(f, "edge"),
            ScorerKind::Color => write!(f, "color"),
            ScorerKind::Compression => write!(f, "compression"),
        }
    }
}

/// Trait for statistical scorer implementations
pub trait FeatureScorer: Send + Sync {
    /// Score an image. `gray` is the grayscale plane of `image`.
    ///
    /// The returned value is clamped by the extractor, so implementors
    /// only need to apply their own saturation.
    fn score(&self, image: &ImageSample, gray: &GrayPlane) -> Result<f64, ScorerFailure>;

    fn kind(&self) -> ScorerKind;
}

/// A score plus the reason it was defaulted, if it was
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ScorerFailure>,
}

impl ScoreOutcome {
    /// Value used when a scorer cannot run
    pub const NEUTRAL: f64 = 0.5;

    pub fn ok(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            failure: None,
        }
    }

    pub fn degraded(failure: ScorerFailure) -> Self {
        Self {
            value: Self::NEUTRAL,
            failure: Some(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }
}

/// Weights of the hybrid statistical score.
///
/// The fusion thresholds were tuned against exactly these values; change
/// them together or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatWeights {
    pub noise: f64,
    pub edge: f64,
    pub color: f64,
    pub compression: f64,
}

impl StatWeights {
    pub const DEFAULT: StatWeights = StatWeights {
        noise: 0.30,
        edge: 0.25,
        color: 0.25,
        compression: 0.20,
    };

    /// Weighted sum of the four scores, clamped to [0, 1]
    pub fn combine(&self, noise: f64, edge: f64, color: f64, compression: f64) -> f64 {
        let hybrid = noise * self.noise
            + edge * self.edge
            + color * self.color
            + compression * self.compression;
        hybrid.clamp(0.0, 1.0)
    }
}

/// The four scores and their weighted combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScoreSet {
    pub noise: ScoreOutcome,
    pub edge: ScoreOutcome,
    pub color: ScoreOutcome,
    pub compression: ScoreOutcome,
    pub hybrid: f64,
}

impl FeatureScoreSet {
    pub fn new(
        noise: ScoreOutcome,
        edge: ScoreOutcome,
        color: ScoreOutcome,
        compression: ScoreOutcome,
    ) -> Self {
        let hybrid = StatWeights::DEFAULT.combine(
            noise.value,
            edge.value,
            color.value,
            compression.value,
        );
        Self {
            noise,
            edge,
            color,
            compression,
            hybrid,
        }
    }

    pub fn get(&self, kind: ScorerKind) -> &ScoreOutcome {
        match kind {
            ScorerKind::Noise => &self.noise,
            ScorerKind::Edge => &self.edge,
            ScorerKind::Color => &self.color,
            ScorerKind::Compression => &self.compression,
        }
    }

    /// Scorers that fell back to the neutral value
    pub fn degraded(&self) -> Vec<(ScorerKind, &ScorerFailure)> {
        [
            ScorerKind::Noise,
            ScorerKind::Edge,
            ScorerKind::Color,
            ScorerKind::Compression,
        ]
        .into_iter()
        .filter_map(|kind| self.get(kind).failure.as_ref().map(|f| (kind, f)))
        .collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded().is_empty()
    }
}

/// Configuration builder for the extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Run the four scorers on the rayon pool
    parallel: bool,
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> StatisticalFeatureExtractor {
        StatisticalFeatureExtractor {
            noise: NoiseScorer::new(),
            edge: EdgeScorer::default(),
            color: ColorScorer,
            compression: CompressionScorer::new(),
            parallel: self.parallel,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs all four scorers and combines them
pub struct StatisticalFeatureExtractor {
    noise: NoiseScorer,
    edge: EdgeScorer,
    color: ColorScorer,
    compression: CompressionScorer,
    parallel: bool,
}

impl StatisticalFeatureExtractor {
    pub fn new() -> Self {
        ExtractorConfig::new().build()
    }

    pub fn extract(&self, image: &ImageSample) -> FeatureScoreSet {
        let gray = GrayPlane::from_sample(image);

        let (noise, edge, color, compression) = if self.parallel {
            let ((noise, edge), (color, compression)) = rayon::join(
                || {
                    rayon::join(
                        || run_scorer(&self.noise, image, &gray),
                        || run_scorer(&self.edge, image, &gray),
                    )
                },
                || {
                    rayon::join(
                        || run_scorer(&self.color, image, &gray),
                        || run_scorer(&self.compression, image, &gray),
                    )
                },
            );
            (noise, edge, color, compression)
        } else {
            (
                run_scorer(&self.noise, image, &gray),
                run_scorer(&self.edge, image, &gray),
                run_scorer(&self.color, image, &gray),
                run_scorer(&self.compression, image, &gray),
            )
        };

        let scores = FeatureScoreSet::new(noise, edge, color, compression);
        tracing::debug!(
            noise = scores.noise.value,
            edge = scores.edge.value,
            color = scores.color.value,
            compression = scores.compression.value,
            hybrid = scores.hybrid,
            "statistical analysis complete"
        );
        scores
    }
}

impl Default for StatisticalFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Fail-soft wrapper: errors and non-finite values become a flagged 0.5
fn run_scorer(scorer: &dyn FeatureScorer, image: &ImageSample, gray: &GrayPlane) -> ScoreOutcome {
    let failure = match scorer.score(image, gray) {
        Ok(value) if value.is_finite() => return ScoreOutcome::ok(value),
        Ok(value) => ScorerFailure::NumericDegeneracy {
            reason: format!("{} score evaluated to {}", scorer.kind(), value),
        },
        Err(failure) => failure,
    };

    tracing::warn!(
        "{} scorer degraded to neutral {}: {}",
        scorer.kind(),
        ScoreOutcome::NEUTRAL,
        failure
    );
    ScoreOutcome::degraded(failure)
}
