//! HTTP client for the model's native runtime daemon
//!
//! The daemon loads the pretrained model once and keeps it resident; the
//! harness talks to it over a small JSON protocol: `POST /infer` for
//! generation, `GET /health` for identity.

use super::{Inference, InferenceBackend, InferenceError, RuntimeInfo};
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    path: &'a str,
    prompt: &'a str,
    max_new_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct InferResponse {
    text: String,
    tokens_generated: u32,
    elapsed_sec: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Inference backend backed by the runtime daemon
#[derive(Debug, Clone)]
pub struct RunnerBackend {
    endpoint: String,
    default_prompt: String,
    client: reqwest::blocking::Client,
}

impl RunnerBackend {
    /// Create a client for the configured endpoint
    pub fn new(config: &Config, endpoint_override: Option<&str>) -> Result<Self, InferenceError> {
        let endpoint = config.endpoint(endpoint_override);
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.runtime.request_timeout_secs))
            .build()?;

        tracing::info!("Runtime endpoint: {}", endpoint);

        Ok(Self {
            endpoint,
            default_prompt: config.inference.default_prompt.clone(),
            client,
        })
    }

    /// The resolved endpoint this backend talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: reqwest::Error) -> InferenceError {
        if err.is_connect() || err.is_timeout() {
            InferenceError::Unavailable {
                endpoint: self.endpoint.clone(),
                source: err,
            }
        } else {
            InferenceError::Transport(err)
        }
    }

    /// Pull an error message out of a non-success response body.
    fn error_message(response: reqwest::blocking::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>() {
            Ok(body) => body.detail,
            Err(_) => format!("HTTP {}", status),
        }
    }
}

impl InferenceBackend for RunnerBackend {
    fn infer(
        &self,
        path: &Path,
        prompt: Option<&str>,
        max_new_tokens: u32,
    ) -> Result<Inference, InferenceError> {
        let file = path.display().to_string();
        // The model expects a question/instruction; fall back to the
        // configured default when the caller supplies none.
        let request = InferRequest {
            path: &file,
            prompt: prompt.unwrap_or(&self.default_prompt),
            max_new_tokens,
        };

        let response = self
            .client
            .post(format!("{}/infer", self.endpoint))
            .json(&request)
            .send()
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(InferenceError::Rejected {
                file,
                message: Self::error_message(response),
            });
        }

        let body: InferResponse = response.json()?;
        tracing::debug!(
            "Runtime generated {} tokens for {} in {:.2}s",
            body.tokens_generated,
            file,
            body.elapsed_sec
        );

        Ok(Inference {
            file,
            text: body.text,
            tokens_generated: body.tokens_generated,
            elapsed_sec: body.elapsed_sec,
        })
    }

    fn health(&self) -> Result<RuntimeInfo, InferenceError> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(InferenceError::Rejected {
                file: self.endpoint.clone(),
                message: Self::error_message(response),
            });
        }

        Ok(response.json()?)
    }

    fn name(&self) -> &'static str {
        "runner"
    }
}
