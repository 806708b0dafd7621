//! # Classifier Module
//!
//! Boundary with the pretrained binary classifier.
//!
//! The model itself is opaque. This module only guarantees its numeric
//! contract:
//! - **Input**: `[1, 128, 128, 3]` RGB tensor scaled to [0, 1]
//! - **Output**: one probability `p = P(fake)` in [0, 1]
//! - **Verdict**: FAKE if `p > 0.5`, confidence is the probability of
//!   the chosen label, so always in [0.5, 1.0]

mod command;
mod input;

pub use command::CommandClassifier;
pub use input::ClassifierInput;

use crate::error::ClassifierError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Binary authenticity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Real,
    Fake,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Real => write!(f, "REAL"),
            Label::Fake => write!(f, "FAKE"),
        }
    }
}

/// Trait for model backends
pub trait Classifier: Send + Sync {
    /// Return P(fake) for a preprocessed input
    fn predict(&self, input: &ClassifierInput) -> Result<f64, ClassifierError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// The classifier's answer, expressed on the label it favours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub label: Label,
    /// Probability mass on `label`, in [0.5, 1.0]
    pub confidence: f64,
    /// Raw model output
    pub p_fake: f64,
}

impl ClassifierVerdict {
    /// Interpret a raw model probability
    pub fn from_probability(p_fake: f64) -> Result<Self, ClassifierError> {
        if !p_fake.is_finite() || !(0.0..=1.0).contains(&p_fake) {
            return Err(ClassifierError::InvalidOutput(format!(
                "{} is not a probability",
                p_fake
            )));
        }

        let (label, confidence) = if p_fake > 0.5 {
            (Label::Fake, p_fake)
        } else {
            (Label::Real, 1.0 - p_fake)
        };

        Ok(Self {
            label,
            confidence,
            p_fake,
        })
    }

    /// Confidence as a percentage string, e.g. `"87.3%"`
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// Preprocesses images and interprets model output around any [`Classifier`]
#[derive(Clone)]
pub struct ClassifierAdapter {
    inner: Arc<dyn Classifier>,
}

impl ClassifierAdapter {
    pub fn new(classifier: impl Classifier + 'static) -> Self {
        Self {
            inner: Arc::new(classifier),
        }
    }

    pub fn from_arc(classifier: Arc<dyn Classifier>) -> Self {
        Self { inner: classifier }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn classify(&self, image: &DynamicImage) -> Result<ClassifierVerdict, ClassifierError> {
        let input = ClassifierInput::from_image(image)?;
        let p_fake = self.inner.predict(&input)?;
        let verdict = ClassifierVerdict::from_probability(p_fake)?;

        tracing::debug!(
            classifier = self.inner.name(),
            p_fake,
            "classifier says {} ({})",
            verdict.label,
            verdict.confidence_percent()
        );
        Ok(verdict)
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("classifier", &self.inner.name())
            .finish()
    }
}
