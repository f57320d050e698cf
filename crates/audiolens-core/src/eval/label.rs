//! Ground-truth label resolution
//!
//! Two sources: a like-named `.txt` file in a parallel directory, or the
//! name of the audio file's immediate parent directory. Output is the raw
//! label; normalization happens uniformly in the driver.

use std::path::{Path, PathBuf};

use super::AudioFile;

/// Per-file label resolution errors
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("No ground-truth file for {file} (expected {expected:?})")]
    Missing { file: String, expected: PathBuf },

    #[error("Failed to read ground-truth file {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the ground-truth label for one audio file.
///
/// File mode reads `{ground_truth_dir}/{stem}.txt`; folder mode uses the
/// parent directory name captured during enumeration and cannot fail.
pub fn resolve_label(
    file: &AudioFile,
    ground_truth_dir: Option<&Path>,
    use_folder_as_label: bool,
) -> Result<String, LabelError> {
    if use_folder_as_label {
        return Ok(file.parent.clone());
    }

    // validate() guarantees the directory is present in file mode
    let gt_dir = ground_truth_dir.expect("ground-truth directory checked during validation");
    let expected = gt_dir.join(format!("{}.txt", file.stem));

    if !expected.exists() {
        return Err(LabelError::Missing {
            file: file.rel_path.clone(),
            expected,
        });
    }

    std::fs::read_to_string(&expected).map_err(|source| LabelError::Unreadable {
        path: expected,
        source,
    })
}
