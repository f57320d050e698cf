//! Transcribe command - describe one or more audio files

use anyhow::{Context, Result};
use audiolens_core::{transcribe_file, transcribe_files, Config, Inference, RunnerBackend};
use console::{style, Term};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn run(
    config: &Config,
    endpoint: Option<&str>,
    path: Option<&str>,
    paths: &[String],
    prompt: Option<&str>,
    max_new_tokens: u32,
    output: Option<&str>,
) -> Result<()> {
    let term = Term::stderr();

    // Collect file paths from either flag
    let inputs: Vec<PathBuf> = match (path, paths.is_empty()) {
        (Some(p), _) => vec![PathBuf::from(p)],
        (None, false) => paths.iter().map(PathBuf::from).collect(),
        (None, true) => anyhow::bail!("Must provide --path or --paths"),
    };

    // Validate paths before any inference runs
    for input in &inputs {
        if !input.exists() {
            anyhow::bail!("File not found: {}", input.display());
        }
    }

    let backend = RunnerBackend::new(config, endpoint)?;

    let results: Vec<Inference> = if inputs.len() == 1 {
        term.write_line(&format!(
            "{} Describing {}",
            style("♪").cyan(),
            inputs[0].display()
        ))?;
        vec![transcribe_file(
            &backend,
            &inputs[0],
            prompt,
            max_new_tokens,
        )?]
    } else {
        term.write_line(&format!(
            "{} Describing {} files...",
            style("♪").cyan(),
            inputs.len()
        ))?;
        transcribe_files(&backend, &inputs, prompt, max_new_tokens)?
    };

    for result in &results {
        term.write_line(&format!(
            "{} {}: {} tokens in {:.2}s",
            style("✓").green(),
            Path::new(&result.file)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| result.file.clone()),
            result.tokens_generated,
            result.elapsed_sec
        ))?;
    }

    // JSON to stdout, status to stderr
    let body = json!({ "results": results });
    println!("{}", serde_json::to_string_pretty(&body)?);

    let output_file = output.unwrap_or("transcribe_results.json");
    std::fs::write(output_file, serde_json::to_string_pretty(&body)?)
        .with_context(|| format!("Failed to write results to {}", output_file))?;
    term.write_line(&format!(
        "{} Results written to {}",
        style("✓").green(),
        output_file
    ))?;

    Ok(())
}
