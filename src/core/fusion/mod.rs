//! # Fusion Module
//!
//! Merges hash, classifier and statistical evidence into one verdict.
//!
//! ## Decision order
//! 1. A known-fake digest wins outright
//! 2. `combined = ai_weight * 0.7 + hybrid * 0.3`, where `ai_weight` is
//!    the classifier's probability of FAKE
//! 3. `combined` picks a tier: strong fake, suspicious, strong real, or
//!    defer to the classifier
//!
//! All comparisons are strict, so exact boundary values fall through to
//! the next tier.

use crate::core::classifier::Label;
use crate::error::FusionError;
use serde::{Deserialize, Serialize};

/// Weight of the classifier in `combined`
pub const AI_WEIGHT: f64 = 0.7;
/// Weight of the hybrid statistical score in `combined`
pub const STATS_WEIGHT: f64 = 0.3;

/// `combined` above this is a strong fake
pub const STRONG_FAKE_THRESHOLD: f64 = 0.7;
/// `combined` above this is suspicious
pub const SUSPICIOUS_THRESHOLD: f64 = 0.6;
/// `combined` below this is a strong real
pub const STRONG_REAL_THRESHOLD: f64 = 0.3;

/// Reported confidence cap for strong fakes
pub const STRONG_FAKE_CAP: f64 = 99.9;
/// Reported confidence cap for suspicious images
pub const SUSPICIOUS_CAP: f64 = 85.0;
/// Reported confidence floor for strong reals
pub const STRONG_REAL_FLOOR: f64 = 85.0;

/// Which evidence path decided the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    HashBased,
    HybridAiStats,
    HybridSuspicious,
    HybridReal,
    AiModelFallback,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::HashBased => "hash_based",
            DetectionMethod::HybridAiStats => "hybrid_ai_stats",
            DetectionMethod::HybridSuspicious => "hybrid_suspicious",
            DetectionMethod::HybridReal => "hybrid_real",
            DetectionMethod::AiModelFallback => "ai_model_fallback",
        }
    }
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final, user-facing verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalVerdict {
    pub label: Label,
    /// One decimal place and a trailing `%`, e.g. `"87.0%"`
    pub confidence_percent: String,
    pub method: DetectionMethod,
}

impl FinalVerdict {
    fn new(label: Label, percent: f64, method: DetectionMethod) -> Self {
        Self {
            label,
            confidence_percent: format_percent(percent),
            method,
        }
    }

    /// Verdict for an exact known-fake digest match
    pub fn hash_match() -> Self {
        Self::new(Label::Fake, 100.0, DetectionMethod::HashBased)
    }
}

impl std::fmt::Display for FinalVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) via {}",
            self.label, self.confidence_percent, self.method
        )
    }
}

/// Format a percentage with one decimal place
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Probability of FAKE implied by a classifier verdict
pub fn ai_weight(label: Label, confidence: f64) -> f64 {
    match label {
        Label::Fake => confidence,
        Label::Real => 1.0 - confidence,
    }
}

/// Weighted combination of classifier and statistical evidence
pub fn combined_score(ai_weight: f64, hybrid_stat_score: f64) -> f64 {
    ai_weight * AI_WEIGHT + hybrid_stat_score * STATS_WEIGHT
}

/// Fuse all evidence into a [`FinalVerdict`].
///
/// A hash match short-circuits before any argument is inspected, so the
/// classifier and scorer inputs may be placeholders in that case.
pub fn fuse(
    label: Label,
    confidence: f64,
    hybrid_stat_score: f64,
    hash_match: bool,
) -> Result<FinalVerdict, FusionError> {
    if hash_match {
        return Ok(FinalVerdict::hash_match());
    }

    if !is_unit(confidence) {
        return Err(FusionError::InvalidConfidence { value: confidence });
    }
    if !is_unit(hybrid_stat_score) {
        return Err(FusionError::InvalidStatScore {
            value: hybrid_stat_score,
        });
    }

    let combined = combined_score(ai_weight(label, confidence), hybrid_stat_score);
    Ok(select_tier(combined, label, confidence))
}

/// Map a combined score to a verdict tier.
pub fn select_tier(combined: f64, label: Label, confidence: f64) -> FinalVerdict {
    if combined > STRONG_FAKE_THRESHOLD {
        FinalVerdict::new(
            Label::Fake,
            (combined * 100.0).min(STRONG_FAKE_CAP),
            DetectionMethod::HybridAiStats,
        )
    } else if combined > SUSPICIOUS_THRESHOLD {
        FinalVerdict::new(
            Label::Fake,
            (combined * 100.0).min(SUSPICIOUS_CAP),
            DetectionMethod::HybridSuspicious,
        )
    } else if combined < STRONG_REAL_THRESHOLD {
        FinalVerdict::new(
            Label::Real,
            ((1.0 - combined) * 100.0).max(STRONG_REAL_FLOOR),
            DetectionMethod::HybridReal,
        )
    } else {
        FinalVerdict::new(label, confidence * 100.0, DetectionMethod::AiModelFallback)
    }
}

fn is_unit(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(label: Label, percent: &str, method: DetectionMethod) -> FinalVerdict {
        FinalVerdict {
            label,
            confidence_percent: percent.to_string(),
            method,
        }
    }

    #[test]
    fn strong_fake_evidence() {
        let result = fuse(Label::Fake, 0.9, 0.8, false).unwrap();
        assert_eq!(result, verdict(Label::Fake, "87.0%", DetectionMethod::HybridAiStats));
    }

    #[test]
    fn strong_real_evidence() {
        let result = fuse(Label::Real, 0.95, 0.1, false).unwrap();
        assert_eq!(result, verdict(Label::Real, "93.5%", DetectionMethod::HybridReal));
    }

    #[test]
    fn uncertain_evidence_defers_to_classifier() {
        let result = fuse(Label::Fake, 0.55, 0.5, false).unwrap();
        assert_eq!(result, verdict(Label::Fake, "55.0%", DetectionMethod::AiModelFallback));
    }

    #[test]
    fn hash_match_wins() {
        let result = fuse(Label::Real, 0.99, 0.0, true).unwrap();
        assert_eq!(result, verdict(Label::Fake, "100.0%", DetectionMethod::HashBased));
    }

    #[test]
    fn hash_match_ignores_invalid_arguments() {
        let result = fuse(Label::Real, f64::NAN, -3.0, true).unwrap();
        assert_eq!(result.method, DetectionMethod::HashBased);
    }

    #[test]
    fn invalid_confidence_is_rejected() {
        assert!(matches!(
            fuse(Label::Fake, f64::NAN, 0.5, false),
            Err(FusionError::InvalidConfidence { .. })
        ));
        assert!(matches!(
            fuse(Label::Fake, 1.2, 0.5, false),
            Err(FusionError::InvalidConfidence { .. })
        ));
    }

    #[test]
    fn invalid_stat_score_is_rejected() {
        assert_eq!(
            fuse(Label::Real, 0.7, -0.5, false),
            Err(FusionError::InvalidStatScore { value: -0.5 })
        );
        assert!(matches!(
            fuse(Label::Real, 0.7, f64::INFINITY, false),
            Err(FusionError::InvalidStatScore { .. })
        ));
    }

    #[test]
    fn exactly_strong_fake_threshold_is_only_suspicious() {
        // 1.0 * 0.7 + 0.0 * 0.3 is exactly 0.7
        let result = fuse(Label::Fake, 1.0, 0.0, false).unwrap();
        assert_eq!(result, verdict(Label::Fake, "70.0%", DetectionMethod::HybridSuspicious));

        let exact = select_tier(0.7, Label::Real, 0.6);
        assert_eq!(exact.method, DetectionMethod::HybridSuspicious);
    }

    #[test]
    fn just_above_strong_fake_threshold() {
        let result = select_tier(0.70001, Label::Real, 0.6);
        assert_eq!(result, verdict(Label::Fake, "70.0%", DetectionMethod::HybridAiStats));
    }

    #[test]
    fn strong_fake_confidence_is_capped() {
        let result = fuse(Label::Fake, 1.0, 1.0, false).unwrap();
        assert_eq!(result, verdict(Label::Fake, "99.9%", DetectionMethod::HybridAiStats));
    }

    #[test]
    fn exactly_suspicious_threshold_falls_back() {
        let result = select_tier(0.6, Label::Real, 0.58);
        assert_eq!(result, verdict(Label::Real, "58.0%", DetectionMethod::AiModelFallback));
    }

    #[test]
    fn just_above_suspicious_threshold() {
        let result = select_tier(0.60001, Label::Real, 0.58);
        assert_eq!(result, verdict(Label::Fake, "60.0%", DetectionMethod::HybridSuspicious));
    }

    #[test]
    fn top_of_suspicious_band() {
        let result = select_tier(0.69999, Label::Real, 0.9);
        assert_eq!(result, verdict(Label::Fake, "70.0%", DetectionMethod::HybridSuspicious));
    }

    #[test]
    fn exactly_strong_real_threshold_falls_back() {
        // Real at 1.0 confidence with saturated stats: 0.0 * 0.7 + 1.0 * 0.3
        let result = fuse(Label::Real, 1.0, 1.0, false).unwrap();
        assert_eq!(result, verdict(Label::Real, "100.0%", DetectionMethod::AiModelFallback));

        let exact = select_tier(0.3, Label::Fake, 0.52);
        assert_eq!(exact.method, DetectionMethod::AiModelFallback);
    }

    #[test]
    fn just_below_strong_real_threshold() {
        let result = select_tier(0.29999, Label::Fake, 0.52);
        assert_eq!(result, verdict(Label::Real, "85.0%", DetectionMethod::HybridReal));
    }

    #[test]
    fn fusion_is_deterministic() {
        let first = fuse(Label::Fake, 0.73, 0.41, false).unwrap();
        for _ in 0..10 {
            assert_eq!(fuse(Label::Fake, 0.73, 0.41, false).unwrap(), first);
        }
    }

    #[test]
    fn ai_weight_flips_for_real() {
        assert_eq!(ai_weight(Label::Fake, 0.8), 0.8);
        assert!((ai_weight(Label::Real, 0.8) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn method_serializes_snake_case() {
        let json = serde_json::to_string(&DetectionMethod::AiModelFallback).unwrap();
        assert_eq!(json, "\"ai_model_fallback\"");
        assert_eq!(
            FinalVerdict::hash_match().to_string(),
            "FAKE (100.0%) via hash_based"
        );
    }
}
