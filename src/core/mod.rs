//! # Core Module
//!
//! The UI-agnostic detection engine.
//!
//! ## Modules
//! - `sample` - Reads, validates and decodes uploaded images
//! - `digest` - SHA-256 content digests and the known-fake set
//! - `stats` - Four statistical heuristics and their hybrid score
//! - `classifier` - Boundary with the pretrained classifier
//! - `fusion` - Merges all evidence into a final verdict
//! - `pipeline` - Runs a request against the shared detector context

pub mod classifier;
pub mod digest;
pub mod fusion;
pub mod pipeline;
pub mod sample;
pub mod stats;

// Re-export commonly used types
pub use classifier::{Classifier, ClassifierVerdict, CommandClassifier, Label};
pub use digest::{ContentDigest, HashMatcher};
pub use fusion::{fuse, DetectionMethod, FinalVerdict};
pub use pipeline::{AnalysisReport, DetectorContext, HealthStatus, VerdictResponse};
pub use sample::ImageSample;
pub use stats::{FeatureScoreSet, ScoreOutcome, StatisticalFeatureExtractor};
