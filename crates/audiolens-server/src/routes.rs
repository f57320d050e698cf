//! Request handlers and error mapping
//!
//! Core calls are blocking (the runtime client and the evaluation loop), so
//! every handler moves them off the async executor with `spawn_blocking`.

use audiolens_core::{
    evaluate, transcribe_files, EvalError, EvaluationReport, EvaluationRequest, Inference,
    InferenceBackend, InferenceError, MatchMode, RuntimeInfo,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::AppState;

/// JSON error body: `{"detail": "..."}`
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));
        (self.status, body).into_response()
    }
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        let status = match &e {
            InferenceError::FileNotFound { .. } => StatusCode::BAD_REQUEST,
            InferenceError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InferenceError::Rejected { .. } | InferenceError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<EvalError> for ApiError {
    fn from(e: EvalError) -> Self {
        let status = match &e {
            EvalError::Enumerate { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // Configuration problems are the caller's
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

fn default_max_new_tokens() -> u32 {
    128
}

#[derive(Debug, Deserialize)]
pub struct TranscribeBody {
    pub paths: Vec<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub results: Vec<Inference>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateBody {
    pub audio_dir: String,
    #[serde(default)]
    pub gt_dir: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub use_folder_as_label: bool,
}

/// Health check endpoint; 503 until the runtime answers
pub async fn healthz(State(state): State<AppState>) -> Result<Json<RuntimeInfo>, ApiError> {
    let backend = state.backend.clone();
    let info = tokio::task::spawn_blocking(move || backend.health())
        .await?
        .map_err(|e| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
    Ok(Json(info))
}

/// Describe audio files
pub async fn transcribe(
    State(state): State<AppState>,
    Json(body): Json<TranscribeBody>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    if body.paths.is_empty() {
        return Err(ApiError::bad_request("paths must not be empty"));
    }

    let paths: Vec<PathBuf> = body.paths.iter().map(PathBuf::from).collect();
    for path in &paths {
        if !path.exists() {
            return Err(ApiError::bad_request(format!(
                "File not found: {}",
                path.display()
            )));
        }
    }

    tracing::info!("Processing {} file(s)", paths.len());
    let backend = state.backend.clone();
    let results = tokio::task::spawn_blocking(move || {
        transcribe_files(
            &backend,
            &paths,
            body.prompt.as_deref(),
            body.max_new_tokens,
        )
    })
    .await??;

    Ok(Json(TranscribeResponse { results }))
}

/// Evaluate the model on a labeled audio folder
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(body): Json<EvaluateBody>,
) -> Result<Json<EvaluationReport>, ApiError> {
    let request = EvaluationRequest {
        audio_dir: PathBuf::from(&body.audio_dir),
        ground_truth_dir: body.gt_dir.map(PathBuf::from),
        prompt: body.prompt,
        max_new_tokens: body.max_new_tokens,
        match_mode: body.match_mode,
        use_folder_as_label: body.use_folder_as_label,
    };
    request.validate()?;

    tracing::info!("Evaluating folder: {}", body.audio_dir);
    let backend = state.backend.clone();
    let report = tokio::task::spawn_blocking(move || evaluate(&backend, &request)).await??;

    tracing::info!(
        "Evaluation complete: {}/{} matched, f1 {:.4}",
        report.summary.tp,
        report.summary.count,
        report.summary.f1
    );

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_body_defaults() {
        let body: EvaluateBody =
            serde_json::from_str(r#"{"audio_dir": "/data/audio"}"#).expect("deserialize");
        assert_eq!(body.max_new_tokens, 128);
        assert_eq!(body.match_mode, MatchMode::Exact);
        assert!(!body.use_folder_as_label);
        assert!(body.gt_dir.is_none());
    }

    #[test]
    fn test_evaluate_body_contains_mode() {
        let body: EvaluateBody = serde_json::from_str(
            r#"{"audio_dir": "/data/audio", "match_mode": "contains", "use_folder_as_label": true}"#,
        )
        .expect("deserialize");
        assert_eq!(body.match_mode, MatchMode::Contains);
        assert!(body.use_folder_as_label);
    }

    #[test]
    fn test_transcribe_body_defaults() {
        let body: TranscribeBody =
            serde_json::from_str(r#"{"paths": ["/a.wav", "/b.wav"]}"#).expect("deserialize");
        assert_eq!(body.paths.len(), 2);
        assert_eq!(body.max_new_tokens, 128);
        assert!(body.prompt.is_none());
    }

    #[test]
    fn test_api_error_status_mapping() {
        let e = ApiError::from(EvalError::MissingGroundTruthDir);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);

        let e = ApiError::from(InferenceError::FileNotFound {
            path: PathBuf::from("/x.wav"),
        });
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert!(e.detail.contains("/x.wav"));
    }
}
