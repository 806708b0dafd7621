//! Request results and service status.

use crate::core::classifier::{ClassifierVerdict, Label};
use crate::core::fusion::{DetectionMethod, FinalVerdict};
use crate::core::stats::FeatureScoreSet;
use serde::{Deserialize, Serialize};

/// Everything one request produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Lowercase SHA-256 of the raw input
    pub digest: String,
    pub verdict: FinalVerdict,
    /// Absent for hash-based verdicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierVerdict>,
    /// Absent for hash-based verdicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureScoreSet>,
}

impl AnalysisReport {
    pub fn is_fake(&self) -> bool {
        self.verdict.label == Label::Fake
    }

    /// Condensed response with the classifier and statistical readings
    pub fn to_response(&self) -> VerdictResponse {
        VerdictResponse {
            result: self.verdict.label,
            confidence: self.verdict.confidence_percent.clone(),
            detection_method: self.verdict.method,
            ai_model_confidence: self.classifier.map(|c| c.confidence_percent()),
            stats_score: self
                .features
                .as_ref()
                .map(|f| format!("{:.3}", f.hybrid)),
        }
    }
}

/// The verdict as reported to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictResponse {
    pub result: Label,
    pub confidence: String,
    pub detection_method: DetectionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model_confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_score: Option<String>,
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub known_fake_digests: usize,
}

impl HealthStatus {
    pub const ONLINE: &'static str = "online";
}
