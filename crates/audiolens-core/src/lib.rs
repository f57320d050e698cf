//! Audiolens Core - offline serving harness for an audio-understanding model
//!
//! This library provides the core functionality for:
//! - The inference adapter boundary to the model's native runtime
//! - Single-file and sequential batch inference
//! - Batch evaluation against ground-truth labels with string-match metrics

pub mod config;
pub mod eval;
pub mod infer;

pub use config::Config;
pub use eval::{
    evaluate, evaluate_with_progress, EvalError, EvaluationReport, EvaluationRequest,
    EvaluationSummary, MatchDetail, MatchMode, SkippedFile,
};
pub use infer::{
    transcribe_file, transcribe_files, Inference, InferenceBackend, InferenceError, RunnerBackend,
    RuntimeInfo,
};

/// Describe a single audio file using the configured runtime
///
/// This is the main entry point for the library.
pub fn describe_audio(
    path: &std::path::Path,
    prompt: Option<&str>,
    config: &Config,
) -> anyhow::Result<Inference> {
    let backend = RunnerBackend::new(config, None)?;
    Ok(transcribe_file(
        &backend,
        path,
        prompt,
        config.inference.max_new_tokens,
    )?)
}
