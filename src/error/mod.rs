//! # Error Module
//!
//! Error types for the hybrid image detector.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, channel counts, what went wrong
//! - **Keep boundaries distinct** - a broken classifier is not the same
//!   thing as a degraded statistical scorer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Fusion error: {0}")]
    Fusion(#[from] FusionError),

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{failed} of {total} files could not be analysed")]
    PartialFailure { failed: usize, total: usize },
}

/// Errors that occur while reading input files
#[derive(Error, Debug)]
pub enum InputError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a recognised image file: {path}")]
    NotAnImage { path: PathBuf },
}

/// Errors that occur when computing content digests
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DigestError {
    #[error("Cannot digest an empty buffer")]
    EmptyInput,

    #[error("Invalid digest '{value}': expected 64 hex characters")]
    InvalidHex { value: String },
}

/// Errors that occur while decoding image bytes
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode image: {reason}")]
    Undecodable { reason: String },

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height}x{channels}")]
    BufferMismatch {
        width: u32,
        height: u32,
        channels: u8,
        actual: usize,
    },

    #[error("Unsupported channel count: {channels} (expected 1 or 3)")]
    UnsupportedChannels { channels: u8 },
}

/// Errors at the boundary with the external classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("No classifier is loaded. Pass --classifier or set DEEPFAKE_CLASSIFIER.")]
    NotLoaded,

    #[error("Failed to load classifier {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("Classifier invocation failed: {0}")]
    InvocationFailed(String),

    #[error("Classifier returned an invalid probability: {0}")]
    InvalidOutput(String),

    #[error("Failed to prepare classifier input: {0}")]
    Preprocess(String),
}

/// Caller-contract violations when fusing evidence
#[derive(Error, Debug, PartialEq)]
pub enum FusionError {
    #[error("Classifier confidence {value} is not a probability in [0, 1]")]
    InvalidConfidence { value: f64 },

    #[error("Statistical score {value} is not in [0, 1]")]
    InvalidStatScore { value: f64 },
}

/// Why a statistical scorer fell back to its neutral value
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScorerFailure {
    #[error("degenerate image dimensions {width}x{height}")]
    DegenerateDimensions { width: u32, height: u32 },

    #[error("unsupported channel layout ({channels} channels)")]
    UnsupportedChannelLayout { channels: u8 },

    #[error("numeric degeneracy: {reason}")]
    NumericDegeneracy { reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DetectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_includes_path() {
        let error = InputError::NotFound {
            path: PathBuf::from("/uploads/portrait.png"),
        };
        assert!(error.to_string().contains("/uploads/portrait.png"));
    }

    #[test]
    fn missing_classifier_suggests_recovery() {
        let message = ClassifierError::NotLoaded.to_string();
        assert!(message.contains("--classifier"));
    }

    #[test]
    fn fusion_error_reports_value() {
        let error = FusionError::InvalidConfidence { value: 1.5 };
        assert!(error.to_string().contains("1.5"));
    }

    #[test]
    fn scorer_failure_serializes_with_kind_tag() {
        let failure = ScorerFailure::UnsupportedChannelLayout { channels: 1 };
        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("\"kind\":\"unsupported_channel_layout\""));
        assert!(json.contains("\"channels\":1"));
    }

    #[test]
    fn errors_convert_into_detector_error() {
        let error: DetectorError = DigestError::EmptyInput.into();
        assert!(matches!(error, DetectorError::Digest(DigestError::EmptyInput)));
    }
}
