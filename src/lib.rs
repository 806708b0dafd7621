//! # Deepfake Detector
//!
//! Labels an image as AI-generated (FAKE) or authentic (REAL).
//!
//! ## Evidence
//! - **Known fakes** - exact SHA-256 matches against a curated digest list
//! - **Classifier** - a pretrained binary model behind the [`core::Classifier`] trait
//! - **Statistics** - noise, edge, colour-correlation and flat-block heuristics
//!
//! A known-fake match decides alone. Otherwise the classifier and the
//! statistics are weighted together and mapped to a confidence tier.
//!
//! ## Architecture
//! - `core` - The detection engine
//! - `error` - Error types for every boundary

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{DetectorError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies to this
/// crate. Calling it twice is harmless.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("deepfake_detector={}", default_level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
