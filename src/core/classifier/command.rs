//! Classifier backed by an external model-serving program.
//!
//! The program receives the input tensor on stdin as little-endian f32
//! values in NHWC order and must print a single probability on stdout.
//! It is started once per prediction, so it should load its model fast
//! or proxy to a long-running server.

use super::{Classifier, ClassifierInput};
use crate::error::ClassifierError;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs `program [args...]` for every prediction
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: PathBuf,
    args: Vec<String>,
    name: String,
}

impl CommandClassifier {
    /// Check the program exists and build the classifier.
    ///
    /// Bare names such as `python3` are looked up on `PATH`; anything with a
    /// directory component must point at an existing file.
    pub fn load(program: &Path, args: Vec<String>) -> Result<Self, ClassifierError> {
        let found = if is_bare_name(program) {
            find_on_path(program).is_some()
        } else {
            program.is_file()
        };

        if !found {
            return Err(ClassifierError::LoadFailed {
                path: program.to_path_buf(),
                reason: if is_bare_name(program) {
                    "program not found on PATH".to_string()
                } else {
                    "program not found".to_string()
                },
            });
        }

        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| program.display().to_string());

        tracing::info!("Classifier ready: {}", program.display());
        Ok(Self {
            program: program.to_path_buf(),
            args,
            name,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Classifier for CommandClassifier {
    fn predict(&self, input: &ClassifierInput) -> Result<f64, ClassifierError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ClassifierError::InvocationFailed(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let payload = input.to_le_bytes();
        let mut stdin = child.stdin.take().ok_or_else(|| {
            ClassifierError::InvocationFailed("classifier stdin unavailable".to_string())
        })?;

        // Feed stdin from a separate thread so a chatty child cannot deadlock us
        let writer = std::thread::spawn(move || stdin.write_all(&payload));

        let output = child.wait_with_output().map_err(|e| {
            ClassifierError::InvocationFailed(format!("Failed to wait for classifier: {}", e))
        })?;

        // A child that exits without reading everything closes the pipe early;
        // its exit status is the more useful error in that case.
        let write_result = writer.join().map_err(|_| {
            ClassifierError::InvocationFailed("stdin writer panicked".to_string())
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClassifierError::InvocationFailed(format!(
                "{} exited with {}: {}",
                self.name,
                output.status,
                stderr.trim()
            )));
        }

        write_result.map_err(|e| {
            ClassifierError::InvocationFailed(format!("Failed to send input tensor: {}", e))
        })?;

        parse_probability(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn is_bare_name(program: &Path) -> bool {
    let mut components = program.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn find_on_path(program: &Path) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Parse the first whitespace-separated token of the program's output
fn parse_probability(stdout: &str) -> Result<f64, ClassifierError> {
    let token = stdout.split_whitespace().next().ok_or_else(|| {
        ClassifierError::InvalidOutput("classifier printed nothing".to_string())
    })?;

    token
        .parse::<f64>()
        .map_err(|_| ClassifierError::InvalidOutput(format!("'{}' is not a number", token)))
}
