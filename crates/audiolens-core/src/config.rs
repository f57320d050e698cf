//! Configuration management for audiolens

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the runtime endpoint
pub const ENDPOINT_ENV: &str = "AUDIOLENS_ENDPOINT";

/// Prompt used when a request does not supply one
pub const DEFAULT_PROMPT: &str = "Please describe the audio in detail.";

/// Connection settings for the model's native runtime daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Base URL of the runtime daemon
    pub endpoint: String,
    /// Per-request timeout in seconds (inference on CPU can be slow)
    pub request_timeout_secs: u64,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8090".to_string(),
            request_timeout_secs: 600,
        }
    }
}

/// Generation parameters passed through to the runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Maximum number of tokens to generate
    pub max_new_tokens: u32,
    /// Prompt used when the caller does not provide one
    pub default_prompt: String,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 128,
            default_prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runtime daemon connection
    pub runtime: RuntimeOptions,
    /// Generation defaults
    pub inference: InferenceOptions,
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "audiolens", "audiolens")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Resolve the runtime endpoint: explicit override, then environment,
    /// then the config file value.
    pub fn endpoint(&self, override_endpoint: Option<&str>) -> String {
        if let Some(ep) = override_endpoint {
            return ep.to_string();
        }
        if let Ok(ep) = std::env::var(ENDPOINT_ENV) {
            if !ep.is_empty() {
                return ep;
            }
        }
        self.runtime.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.inference.max_new_tokens, 128);
        assert_eq!(config.inference.default_prompt, DEFAULT_PROMPT);
        assert!(config.runtime.endpoint.starts_with("http://"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[runtime]\nendpoint = \"http://10.0.0.1:9000\"\n")
            .expect("partial config should parse");
        assert_eq!(config.runtime.endpoint, "http://10.0.0.1:9000");
        assert_eq!(config.inference.max_new_tokens, 128);
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let config = Config::default();
        assert_eq!(
            config.endpoint(Some("http://gpu-box:8090")),
            "http://gpu-box:8090"
        );
    }
}
