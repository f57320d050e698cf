//! Inference adapter boundary
//!
//! The model's native runtime owns weights and tensor inference; this module
//! defines the narrow interface the harness consumes, plus the sequential
//! single-file and batch entry points built on top of it.

mod runner;

pub use runner::RunnerBackend;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One inference result for one audio file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inference {
    /// Input path as given by the caller
    pub file: String,
    /// Generated text
    pub text: String,
    /// Number of tokens the runtime generated
    pub tokens_generated: u32,
    /// Wall-clock inference time reported by the runtime
    pub elapsed_sec: f64,
}

/// Identity and health of the runtime, as it advertises itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub status: String,
    pub device: String,
    pub model: String,
}

/// Inference adapter errors
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Audio file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Runtime at {endpoint} is unreachable: {source}")]
    Unavailable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Runtime rejected {file}: {message}")]
    Rejected { file: String, message: String },

    #[error("Runtime request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Trait for inference backends
///
/// Constructed once and passed explicitly into callers (the evaluation
/// driver, the CLI, the server), never reached through global state.
pub trait InferenceBackend: Send + Sync {
    /// Run the model on a single audio file
    ///
    /// # Arguments
    /// * `path` - Audio file on a filesystem the runtime can also see
    /// * `prompt` - Optional question/instruction; the configured default
    ///   prompt is applied when absent
    /// * `max_new_tokens` - Generation cap
    fn infer(
        &self,
        path: &Path,
        prompt: Option<&str>,
        max_new_tokens: u32,
    ) -> Result<Inference, InferenceError>;

    /// Query runtime identity and health
    fn health(&self) -> Result<RuntimeInfo, InferenceError>;

    /// Get the backend name for logging
    fn name(&self) -> &'static str;
}

/// Run inference on a single file, validating the path first.
pub fn transcribe_file(
    backend: &dyn InferenceBackend,
    path: &Path,
    prompt: Option<&str>,
    max_new_tokens: u32,
) -> Result<Inference, InferenceError> {
    if !path.exists() {
        return Err(InferenceError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Running inference on {:?} via {}", path, backend.name());
    backend.infer(path, prompt, max_new_tokens)
}

/// Run inference on multiple files, sequentially, preserving input order.
///
/// Fails fast: the first error aborts the batch. The evaluation driver is
/// the only place with per-file failure isolation.
pub fn transcribe_files(
    backend: &dyn InferenceBackend,
    paths: &[PathBuf],
    prompt: Option<&str>,
    max_new_tokens: u32,
) -> Result<Vec<Inference>, InferenceError> {
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        results.push(transcribe_file(backend, path, prompt, max_new_tokens)?);
    }
    Ok(results)
}
