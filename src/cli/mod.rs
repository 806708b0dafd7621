//! # CLI Module
//!
//! Command-line interface for the deepfake detector.
//!
//! ## Usage
//! ```bash
//! # Analyse images with an external model server
//! deepfake-detect analyze portrait.jpg --classifier ./serve-model
//!
//! # Known-fake digests from a custom file
//! deepfake-detect analyze uploads/*.png --hashes catalogue.json
//!
//! # JSON output with per-scorer detail
//! deepfake-detect analyze portrait.jpg --output json
//!
//! # SHA-256 of files, for checking against the digest list
//! deepfake-detect digest portrait.jpg
//!
//! # Service status
//! deepfake-detect health
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use deepfake_detector::core::classifier::CommandClassifier;
use deepfake_detector::core::digest::ContentDigest;
use deepfake_detector::core::fusion::DetectionMethod;
use deepfake_detector::core::pipeline::{AnalysisReport, DetectorContext, HealthStatus};
use deepfake_detector::core::sample::read_file_bytes;
use deepfake_detector::core::stats::ScorerKind;
use deepfake_detector::error::{DetectorError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;

/// Deepfake Detector - Hash, model and statistical evidence in one verdict
#[derive(Parser, Debug)]
#[command(name = "deepfake-detect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify images as FAKE or REAL
    Analyze {
        /// Image files to analyse
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        detector: DetectorArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the SHA-256 digest of each file
    Digest {
        /// Files to digest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Report whether the detector is ready
    Health {
        #[command(flatten)]
        detector: DetectorArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

/// Options shared by every command that builds a detector
#[derive(Args, Debug)]
struct DetectorArgs {
    /// Known-fake digest file (JSON)
    #[arg(long, env = "DEEPFAKE_HASH_DB", default_value = "fake_images_hashes.json")]
    hashes: PathBuf,

    /// Classifier program: reads the f32 input tensor on stdin, prints P(fake)
    #[arg(long, env = "DEEPFAKE_CLASSIFIER")]
    classifier: Option<PathBuf>,

    /// Extra argument for the classifier program (repeatable)
    #[arg(long = "classifier-arg", allow_hyphen_values = true)]
    classifier_args: Vec<String>,
}

impl DetectorArgs {
    /// Build the detector. A classifier that fails to load is logged and
    /// left out, so hash lookups and health reports keep working.
    fn build_context(&self) -> DetectorContext {
        let mut builder = DetectorContext::builder().known_fakes_path(&self.hashes);

        if let Some(program) = &self.classifier {
            match CommandClassifier::load(program, self.classifier_args.clone()) {
                Ok(classifier) => builder = builder.classifier(classifier),
                Err(e) => tracing::warn!("{}; continuing without a classifier", e),
            }
        }

        builder.build()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            paths,
            detector,
            output,
            verbose,
        } => {
            deepfake_detector::init_tracing(if verbose { "debug" } else { "warn" });
            run_analyze(paths, &detector, output, verbose)
        }
        Commands::Digest { paths } => {
            deepfake_detector::init_tracing("warn");
            run_digest(paths)
        }
        Commands::Health { detector, output } => {
            deepfake_detector::init_tracing("warn");
            run_health(&detector, output)
        }
    }
}

fn run_analyze(
    paths: Vec<PathBuf>,
    detector: &DetectorArgs,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Deepfake Detector").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let context = detector.build_context();

    // Progress bar only pays off for batches
    let progress = if matches!(output, OutputFormat::Pretty) && paths.len() > 1 {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let results: Vec<(PathBuf, Result<AnalysisReport>)> = paths
        .par_iter()
        .map(|path| {
            let result = context.analyze_file(path);
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            (path.clone(), result)
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &results, verbose),
        OutputFormat::Json => print_json_results(&results)?,
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        return Err(DetectorError::PartialFailure {
            failed,
            total: results.len(),
        });
    }

    Ok(())
}

fn print_pretty_results(term: &Term, results: &[(PathBuf, Result<AnalysisReport>)], verbose: bool) {
    for (path, result) in results {
        match result {
            Ok(report) => {
                let label = if report.is_fake() {
                    style(report.verdict.label.to_string()).red().bold()
                } else {
                    style(report.verdict.label.to_string()).green().bold()
                };

                term.write_line(&format!(
                    "{} {}  {} {}",
                    style("●").dim(),
                    path.display(),
                    label,
                    style(&report.verdict.confidence_percent).cyan()
                ))
                .ok();
                term.write_line(&format!(
                    "    {} {}",
                    style("method:").dim(),
                    describe_method(report.verdict.method)
                ))
                .ok();

                if verbose {
                    print_evidence(term, report);
                }
            }
            Err(e) => {
                term.write_line(&format!(
                    "{} {}  {}",
                    style("✗").red().bold(),
                    path.display(),
                    style(e).red()
                ))
                .ok();
            }
        }
    }

    let fakes = results
        .iter()
        .filter(|(_, r)| r.as_ref().is_ok_and(|report| report.is_fake()))
        .count();
    let analysed = results.iter().filter(|(_, r)| r.is_ok()).count();

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} analysed, {} flagged as FAKE",
        style(analysed).cyan(),
        style(fakes).yellow()
    ))
    .ok();
}

fn print_evidence(term: &Term, report: &AnalysisReport) {
    term.write_line(&format!("    {} {}", style("sha256:").dim(), report.digest))
        .ok();

    if let Some(classifier) = &report.classifier {
        term.write_line(&format!(
            "    {} {} ({})",
            style("model:").dim(),
            classifier.label,
            classifier.confidence_percent()
        ))
        .ok();
    }

    if let Some(features) = &report.features {
        for kind in [
            ScorerKind::Noise,
            ScorerKind::Edge,
            ScorerKind::Color,
            ScorerKind::Compression,
        ] {
            let outcome = features.get(kind);
            let note = match &outcome.failure {
                Some(failure) => style(format!("  (neutral: {})", failure)).yellow().to_string(),
                None => String::new(),
            };
            term.write_line(&format!(
                "    {} {:.3}{}",
                style(format!("{}:", kind)).dim(),
                outcome.value,
                note
            ))
            .ok();
        }
        term.write_line(&format!(
            "    {} {:.3}",
            style("stats:").dim(),
            features.hybrid
        ))
        .ok();
    }
}

fn describe_method(method: DetectionMethod) -> String {
    let explanation = match method {
        DetectionMethod::HashBased => "matches a known fake",
        DetectionMethod::HybridAiStats => "model and statistics agree",
        DetectionMethod::HybridSuspicious => "suspicious",
        DetectionMethod::HybridReal => "model and statistics agree",
        DetectionMethod::AiModelFallback => "uncertain, model decides",
    };
    format!("{} {}", method, style(format!("({})", explanation)).dim())
}

fn print_json_results(results: &[(PathBuf, Result<AnalysisReport>)]) -> Result<()> {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|(path, result)| match result {
            Ok(report) => serde_json::json!({
                "path": path,
                "response": report.to_response(),
                "report": report,
            }),
            Err(e) => serde_json::json!({
                "path": path,
                "error": e.to_string(),
            }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_digest(paths: Vec<PathBuf>) -> Result<()> {
    let mut failed = 0;

    for path in &paths {
        let digest = read_file_bytes(path)
            .map_err(DetectorError::from)
            .and_then(|bytes| ContentDigest::of(&bytes).map_err(DetectorError::from));

        match digest {
            Ok(digest) => println!("{}  {}", digest, path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", style("✗").red().bold(), path.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(DetectorError::PartialFailure {
            failed,
            total: paths.len(),
        });
    }

    Ok(())
}

fn run_health(detector: &DetectorArgs, output: OutputFormat) -> Result<()> {
    let health = detector.build_context().health();

    match output {
        OutputFormat::Pretty => print_pretty_health(&health),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
    }

    Ok(())
}

fn print_pretty_health(health: &HealthStatus) {
    let term = Term::stdout();
    let model = if health.model_loaded {
        style("loaded").green()
    } else {
        style("not loaded").yellow()
    };

    term.write_line(&format!(
        "  {} {}",
        style("status:").dim(),
        style(&health.status).green().bold()
    ))
    .ok();
    term.write_line(&format!("  {} {}", style("model:").dim(), model)).ok();
    term.write_line(&format!(
        "  {} {}",
        style("known fakes:").dim(),
        style(health.known_fake_digests).cyan()
    ))
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepfake_detector::core::classifier::Label;
    use deepfake_detector::error::ClassifierError;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn args(hashes: PathBuf, classifier: Option<&str>) -> DetectorArgs {
        DetectorArgs {
            hashes,
            classifier: classifier.map(PathBuf::from),
            classifier_args: Vec::new(),
        }
    }

    fn write_png(dir: &std::path::Path) -> (PathBuf, Vec<u8>) {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(32, 32, |x, y| {
            Rgb([(x * 7) as u8, (y * 7) as u8, 90])
        }));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let path = dir.join("upload.png");
        std::fs::write(&path, &bytes).unwrap();
        (path, bytes)
    }

    #[test]
    fn health_survives_missing_classifier_program() {
        let temp_dir = TempDir::new().unwrap();
        let health = args(temp_dir.path().join("absent.json"), Some("/nope/serve-model"))
            .build_context()
            .health();

        assert_eq!(health.status, "online");
        assert!(!health.model_loaded);
    }

    #[test]
    fn known_fake_is_answered_despite_broken_classifier() {
        let temp_dir = TempDir::new().unwrap();
        let (image_path, bytes) = write_png(temp_dir.path());

        let db = temp_dir.path().join("fake_images_hashes.json");
        let body = serde_json::json!({
            "description": "catalogue",
            "total_images": 1,
            "hashes": [ContentDigest::of(&bytes).unwrap().to_hex()],
        });
        std::fs::write(&db, body.to_string()).unwrap();

        let context = args(db, Some("/nope/serve-model")).build_context();
        let report = context.analyze_file(&image_path).unwrap();

        assert_eq!(report.verdict.label, Label::Fake);
        assert_eq!(report.verdict.method, DetectionMethod::HashBased);
    }

    #[test]
    fn unmatched_image_reports_missing_classifier() {
        let temp_dir = TempDir::new().unwrap();
        let (image_path, _) = write_png(temp_dir.path());

        let context = args(temp_dir.path().join("absent.json"), Some("/nope/serve-model"))
            .build_context();

        assert!(matches!(
            context.analyze_file(&image_path),
            Err(DetectorError::Classifier(ClassifierError::NotLoaded))
        ));
    }
}
