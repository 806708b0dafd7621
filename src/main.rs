//! # deepfake-detect CLI
//!
//! Command-line interface for the hybrid deepfake detector.
//!
//! ## Usage
//! ```bash
//! deepfake-detect analyze portrait.jpg --classifier ./serve-model
//! deepfake-detect analyze uploads/*.png --output json
//! deepfake-detect health
//! ```

mod cli;

use deepfake_detector::Result;

fn main() -> Result<()> {
    cli::run()
}
