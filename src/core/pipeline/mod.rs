//! # Pipeline Module
//!
//! Orchestrates one detection request.
//!
//! ## Pipeline Stages
//! 1. **Digest** - SHA-256 of the raw upload, checked against known fakes
//! 2. **Decode** - bytes to pixels (only if the digest did not match)
//! 3. **Analyse** - classifier and statistical scorers, concurrently
//! 4. **Fuse** - combine the evidence into a final verdict
//!
//! ## Shared State
//! The known-fake digests, the classifier and the scorer configuration
//! live in a [`DetectorContext`] that is built once and never mutated.
//! It is `Send + Sync`, so requests can run in parallel against it.

mod context;
mod report;

pub use context::{DetectorContext, DetectorContextBuilder};
pub use report::{AnalysisReport, HealthStatus, VerdictResponse};
