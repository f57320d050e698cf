//! Evaluate command - score the model against a labeled audio folder

use anyhow::{Context, Result};
use audiolens_core::{
    evaluate_with_progress, Config, EvaluationReport, EvaluationRequest, MatchMode, RunnerBackend,
};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

pub struct Args {
    pub audio_dir: String,
    pub gt_dir: Option<String>,
    pub use_folder_as_label: bool,
    pub prompt: Option<String>,
    pub max_new_tokens: u32,
    pub match_mode: String,
    pub output: Option<String>,
}

pub fn run(config: &Config, endpoint: Option<&str>, args: Args) -> Result<()> {
    let term = Term::stderr();

    let match_mode: MatchMode = args
        .match_mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let request = EvaluationRequest {
        audio_dir: PathBuf::from(&args.audio_dir),
        ground_truth_dir: args.gt_dir.map(PathBuf::from),
        prompt: args.prompt,
        max_new_tokens: args.max_new_tokens,
        match_mode,
        use_folder_as_label: args.use_folder_as_label,
    };
    request.validate()?;

    if args.use_folder_as_label {
        term.write_line(&format!(
            "{} Evaluating {} (subfolder names as labels, {} match)",
            style("📊").cyan(),
            args.audio_dir,
            match_mode
        ))?;
    } else {
        term.write_line(&format!(
            "{} Evaluating {} ({} match)",
            style("📊").cyan(),
            args.audio_dir,
            match_mode
        ))?;
    }

    let backend = RunnerBackend::new(config, endpoint)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let report = evaluate_with_progress(&backend, &request, |index, total, file| {
        pb.set_length(total as u64);
        pb.set_position(index as u64);
        pb.set_message(file.rel_path.clone());
    })?;
    pb.finish_and_clear();

    // JSON to stdout, status to stderr
    println!("{}", serde_json::to_string_pretty(&report)?);

    let output_file = args.output.as_deref().unwrap_or("evaluation_results.json");
    std::fs::write(output_file, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write results to {}", output_file))?;
    term.write_line(&format!(
        "{} Results written to {}",
        style("✓").green(),
        output_file
    ))?;

    print_summary(&term, &report)?;

    Ok(())
}

fn print_summary(term: &Term, report: &EvaluationReport) -> Result<()> {
    let summary = &report.summary;

    term.write_line("")?;
    term.write_line(&format!("{}", style("═".repeat(40)).dim()))?;
    term.write_line(&format!("{}", style("EVALUATION SUMMARY").bold()))?;
    term.write_line(&format!("{}", style("═".repeat(40)).dim()))?;
    term.write_line(&format!("Total files:     {}", style(summary.count).cyan()))?;
    term.write_line(&format!("True positives:  {}", style(summary.tp).green()))?;
    term.write_line(&format!("False positives: {}", style(summary.fp).yellow()))?;
    term.write_line(&format!("False negatives: {}", style(summary.fn_).yellow()))?;
    term.write_line(&format!("Precision:       {:.4}", summary.precision))?;
    term.write_line(&format!("Recall:          {:.4}", summary.recall))?;
    term.write_line(&format!("F1 score:        {:.4}", summary.f1))?;

    if !report.skipped.is_empty() {
        term.write_line("")?;
        term.write_line(&format!(
            "{} {} file(s) excluded from aggregation:",
            style("⚠").yellow(),
            report.skipped.len()
        ))?;
        for skip in &report.skipped {
            term.write_line(&format!("  {}: {}", skip.file, skip.reason))?;
        }
    }

    Ok(())
}
