//! Detector context and per-request orchestration.

use super::report::{AnalysisReport, HealthStatus};
use crate::core::classifier::{Classifier, ClassifierAdapter};
use crate::core::digest::{ContentDigest, HashMatcher};
use crate::core::fusion::{fuse, FinalVerdict};
use crate::core::sample::{decode_bytes, read_file_bytes, validate_image_header, ImageSample};
use crate::core::stats::{ExtractorConfig, StatisticalFeatureExtractor};
use crate::error::{ClassifierError, InputError, Result};
use std::path::{Path, PathBuf};

/// Builder for [`DetectorContext`]
#[derive(Default)]
pub struct DetectorContextBuilder {
    known_fakes_path: Option<PathBuf>,
    matcher: Option<HashMatcher>,
    classifier: Option<ClassifierAdapter>,
    extractor: ExtractorConfig,
}

impl DetectorContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load known-fake digests from a JSON file at build time.
    ///
    /// A missing or malformed file leaves hash-based detection disabled.
    pub fn known_fakes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_fakes_path = Some(path.into());
        self
    }

    /// Use an already-built digest set (takes precedence over a path)
    pub fn known_fakes(mut self, matcher: HashMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Some(ClassifierAdapter::new(classifier));
        self
    }

    pub fn classifier_adapter(mut self, adapter: ClassifierAdapter) -> Self {
        self.classifier = Some(adapter);
        self
    }

    pub fn extractor(mut self, config: ExtractorConfig) -> Self {
        self.extractor = config;
        self
    }

    pub fn build(self) -> DetectorContext {
        let matcher = match (self.matcher, self.known_fakes_path) {
            (Some(matcher), _) => matcher,
            (None, Some(path)) => HashMatcher::load_or_empty(&path),
            (None, None) => HashMatcher::empty(),
        };

        if self.classifier.is_none() {
            tracing::warn!("No classifier configured; only hash matches can be answered");
        }

        DetectorContext {
            matcher,
            classifier: self.classifier,
            extractor: self.extractor.build(),
        }
    }
}

/// Process-wide, read-only detector state
pub struct DetectorContext {
    matcher: HashMatcher,
    classifier: Option<ClassifierAdapter>,
    extractor: StatisticalFeatureExtractor,
}

impl DetectorContext {
    pub fn builder() -> DetectorContextBuilder {
        DetectorContextBuilder::new()
    }

    pub fn known_fakes(&self) -> &HashMatcher {
        &self.matcher
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: HealthStatus::ONLINE.to_string(),
            model_loaded: self.model_loaded(),
            known_fake_digests: self.matcher.len(),
        }
    }

    /// Analyse one uploaded image.
    ///
    /// Known fakes are answered from the digest alone, before the image is
    /// decoded and before a classifier is required.
    pub fn analyze(&self, bytes: &[u8]) -> Result<AnalysisReport> {
        let digest = ContentDigest::of(bytes)?;

        if self.matcher.contains(&digest) {
            let verdict = FinalVerdict::hash_match();
            tracing::info!("Verdict: {} [{}]", verdict, digest);
            return Ok(AnalysisReport {
                digest: digest.to_hex(),
                verdict,
                classifier: None,
                features: None,
            });
        }

        let classifier = self.classifier.as_ref().ok_or(ClassifierError::NotLoaded)?;

        let image = decode_bytes(bytes)?;
        let sample = ImageSample::from_dynamic(&image);

        let (classified, features) = rayon::join(
            || classifier.classify(&image),
            || self.extractor.extract(&sample),
        );
        let classified = classified?;

        let verdict = fuse(
            classified.label,
            classified.confidence,
            features.hybrid,
            false,
        )?;
        tracing::info!("Verdict: {} [{}]", verdict, digest);

        Ok(AnalysisReport {
            digest: digest.to_hex(),
            verdict,
            classifier: Some(classified),
            features: Some(features),
        })
    }

    /// Read, validate and analyse an image file.
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisReport> {
        let bytes = read_file_bytes(path)?;

        if !validate_image_header(&bytes) {
            return Err(InputError::NotAnImage {
                path: path.to_path_buf(),
            }
            .into());
        }

        tracing::debug!("Analysing {} ({} bytes)", path.display(), bytes.len());
        self.analyze(&bytes)
    }
}

impl std::fmt::Debug for DetectorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorContext")
            .field("known_fakes", &self.matcher.len())
            .field("classifier", &self.classifier)
            .finish()
    }
}
