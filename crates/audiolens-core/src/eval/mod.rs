//! Batch evaluation: score model outputs against ground-truth labels
//!
//! The driver enumerates audio files, resolves each file's label, runs the
//! inference adapter, normalizes both strings, applies the match policy and
//! aggregates the outcomes. Per-file failures (missing label, inference
//! error) exclude that file and surface as diagnostics; they never abort
//! the batch. Configuration errors fail the whole request up front.

mod label;
mod matcher;
mod metrics;
mod normalize;

pub use label::LabelError;
pub use matcher::{matches, MatchMode};
pub use metrics::{EvaluationSummary, MatchDetail};
pub use normalize::normalize;

use crate::infer::InferenceBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Audio container extensions recognized during enumeration. Filtering is
/// by extension only; file contents are never sniffed.
pub const AUDIO_EXTENSIONS: [&str; 4] = ["wav", "flac", "mp3", "m4a"];

/// One evaluation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Directory of audio files (or of category subdirectories when
    /// `use_folder_as_label` is set)
    pub audio_dir: PathBuf,
    /// Directory of `{stem}.txt` label files; ignored in folder-label mode
    pub ground_truth_dir: Option<PathBuf>,
    /// Optional prompt forwarded to the runtime
    pub prompt: Option<String>,
    /// Generation cap forwarded to the runtime
    pub max_new_tokens: u32,
    /// Match policy applied to normalized strings
    pub match_mode: MatchMode,
    /// Take labels from the immediate parent directory name instead of
    /// label files
    pub use_folder_as_label: bool,
}

/// Fatal evaluation errors (checked before any file is processed)
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Audio directory not found: {path:?}")]
    AudioDirNotFound { path: PathBuf },

    #[error("Ground-truth directory not found: {path:?}")]
    GroundTruthDirNotFound { path: PathBuf },

    #[error("A ground-truth directory is required unless labels come from folder names")]
    MissingGroundTruthDir,

    #[error("Failed to enumerate {path:?}: {source}")]
    Enumerate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One audio file found during enumeration
#[derive(Debug, Clone)]
pub struct AudioFile {
    /// Full path
    pub path: PathBuf,
    /// Path relative to the evaluation root (bare file name in flat
    /// layouts)
    pub rel_path: String,
    /// File name without its extension
    pub stem: String,
    /// Name of the immediate parent directory
    pub parent: String,
}

/// Per-file exclusion diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Result of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub summary: EvaluationSummary,
    /// Per-file outcomes in enumeration order
    pub details: Vec<MatchDetail>,
    /// Files excluded from aggregation, with reasons
    pub skipped: Vec<SkippedFile>,
}

impl EvaluationRequest {
    /// Check the request before touching any audio file. Mode 1 requires a
    /// ground-truth directory; both directories must exist.
    pub fn validate(&self) -> Result<(), EvalError> {
        if !self.audio_dir.is_dir() {
            return Err(EvalError::AudioDirNotFound {
                path: self.audio_dir.clone(),
            });
        }

        if !self.use_folder_as_label {
            let gt_dir = self
                .ground_truth_dir
                .as_ref()
                .ok_or(EvalError::MissingGroundTruthDir)?;
            if !gt_dir.is_dir() {
                return Err(EvalError::GroundTruthDirNotFound {
                    path: gt_dir.clone(),
                });
            }
        }

        Ok(())
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            AUDIO_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

fn audio_file_record(root: &Path, path: PathBuf) -> AudioFile {
    let rel_path = path
        .strip_prefix(root)
        .unwrap_or(&path)
        .to_string_lossy()
        .to_string();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    AudioFile {
        path,
        rel_path,
        stem,
        parent,
    }
}

/// Enumerate audio files under `root` in a deterministic order.
///
/// Flat mode scans the directory itself; folder-label mode scans one level
/// down, inside each category subdirectory. Results are sorted
/// lexicographically by path so runs are reproducible regardless of
/// filesystem enumeration order.
pub fn collect_audio_files(root: &Path, use_folder_as_label: bool) -> Result<Vec<AudioFile>, EvalError> {
    let read_dir = |dir: &Path| -> Result<Vec<PathBuf>, EvalError> {
        let entries = std::fs::read_dir(dir).map_err(|source| EvalError::Enumerate {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| EvalError::Enumerate {
                path: dir.to_path_buf(),
                source,
            })?;
            paths.push(entry.path());
        }
        Ok(paths)
    };

    let mut files = Vec::new();
    if use_folder_as_label {
        for subdir in read_dir(root)? {
            if !subdir.is_dir() {
                continue;
            }
            for path in read_dir(&subdir)? {
                if path.is_file() && is_audio_file(&path) {
                    files.push(path);
                }
            }
        }
    } else {
        for path in read_dir(root)? {
            if path.is_file() && is_audio_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files
        .into_iter()
        .map(|path| audio_file_record(root, path))
        .collect())
}

/// Run one evaluation.
pub fn evaluate(
    backend: &dyn InferenceBackend,
    request: &EvaluationRequest,
) -> Result<EvaluationReport, EvalError> {
    evaluate_with_progress(backend, request, |_, _, _| {})
}

/// Run one evaluation, reporting `(index, total, file)` before each file is
/// processed.
pub fn evaluate_with_progress(
    backend: &dyn InferenceBackend,
    request: &EvaluationRequest,
    mut progress: impl FnMut(usize, usize, &AudioFile),
) -> Result<EvaluationReport, EvalError> {
    request.validate()?;

    let files = collect_audio_files(&request.audio_dir, request.use_folder_as_label)?;
    let total = files.len();
    tracing::info!(
        "Evaluating {} file(s) in {:?} (mode: {})",
        total,
        request.audio_dir,
        request.match_mode
    );

    let gt_dir = request.ground_truth_dir.as_deref();
    let mut details = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (index, file) in files.iter().enumerate() {
        progress(index, total, file);

        let gt = match label::resolve_label(file, gt_dir, request.use_folder_as_label) {
            Ok(gt) => gt,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.rel_path, e);
                skipped.push(SkippedFile {
                    file: file.rel_path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let inference = match backend.infer(
            &file.path,
            request.prompt.as_deref(),
            request.max_new_tokens,
        ) {
            Ok(inference) => inference,
            Err(e) => {
                tracing::warn!("Inference failed for {}: {}", file.rel_path, e);
                skipped.push(SkippedFile {
                    file: file.rel_path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let matched = matches(
            &normalize(&inference.text),
            &normalize(&gt),
            request.match_mode,
        );

        details.push(MatchDetail {
            file: file.rel_path.clone(),
            pred: inference.text,
            gt,
            matched: u8::from(matched),
        });
    }

    let summary = EvaluationSummary::from_details(&details);
    tracing::info!(
        "Evaluation complete: {}/{} matched, {} skipped",
        summary.tp,
        summary.count,
        skipped.len()
    );

    Ok(EvaluationReport {
        summary,
        details,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_audio_file_extension_filter() {
        assert!(is_audio_file(Path::new("a.wav")));
        assert!(is_audio_file(Path::new("a.FLAC")));
        assert!(is_audio_file(Path::new("dir/a.mp3")));
        assert!(is_audio_file(Path::new("a.m4a")));
        assert!(!is_audio_file(Path::new("a.txt")));
        assert!(!is_audio_file(Path::new("a.ogg")));
        assert!(!is_audio_file(Path::new("wav")));
    }

    #[test]
    fn test_validate_requires_gt_dir_in_file_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let request = EvaluationRequest {
            audio_dir: dir.path().to_path_buf(),
            ground_truth_dir: None,
            prompt: None,
            max_new_tokens: 64,
            match_mode: MatchMode::Exact,
            use_folder_as_label: false,
        };
        assert!(matches!(
            request.validate(),
            Err(EvalError::MissingGroundTruthDir)
        ));
    }

    #[test]
    fn test_validate_ignores_gt_dir_in_folder_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let request = EvaluationRequest {
            audio_dir: dir.path().to_path_buf(),
            ground_truth_dir: None,
            prompt: None,
            max_new_tokens: 64,
            match_mode: MatchMode::Contains,
            use_folder_as_label: true,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_audio_dir() {
        let request = EvaluationRequest {
            audio_dir: PathBuf::from("/no/such/dir"),
            ground_truth_dir: None,
            prompt: None,
            max_new_tokens: 64,
            match_mode: MatchMode::Exact,
            use_folder_as_label: true,
        };
        assert!(matches!(
            request.validate(),
            Err(EvalError::AudioDirNotFound { .. })
        ));
    }

    #[test]
    fn test_collect_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["c.wav", "a.wav", "b.flac", "notes.txt", "d.ogg"] {
            std::fs::write(dir.path().join(name), b"").expect("write");
        }

        let files = collect_audio_files(dir.path(), false).expect("collect");
        let names: Vec<_> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(names, ["a.wav", "b.flac", "c.wav"]);
    }

    #[test]
    fn test_collect_folder_mode_scans_one_level() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("piano")).expect("mkdir");
        std::fs::create_dir(dir.path().join("guitar")).expect("mkdir");
        std::fs::write(dir.path().join("piano/x.wav"), b"").expect("write");
        std::fs::write(dir.path().join("guitar/y.wav"), b"").expect("write");
        // Top-level files are not part of any category
        std::fs::write(dir.path().join("stray.wav"), b"").expect("write");

        let files = collect_audio_files(dir.path(), true).expect("collect");
        let names: Vec<_> = files.iter().map(|f| f.rel_path.as_str()).collect();
        assert_eq!(names, ["guitar/y.wav", "piano/x.wav"]);
        assert_eq!(files[0].parent, "guitar");
        assert_eq!(files[1].stem, "x");
    }
}
