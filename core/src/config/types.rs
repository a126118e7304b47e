//! Backend configuration types
//!
//! Core only accepts fully resolved configuration.
//! All discovery, loading, and merging happens in the CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Name under which the TensorRT-LLM backend registers itself
pub const BACKEND_NAME: &str = "tensorrt-llm";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Where the inference engine is served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEndpoint {
    /// Base URL of the OpenAI-compatible server (without `/v1`)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token, if the server requires one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for EngineEndpoint {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// A fully resolved TensorRT-LLM backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrtLlmConfig {
    /// Backend name
    #[serde(default = "default_name")]
    pub name: String,
    /// Pretrained model identifier (hub id or local directory)
    pub model: String,
    /// Label selecting the engine-specific model loader
    pub model_type: String,
    /// Device the engine runs on
    #[serde(default = "default_device")]
    pub device: String,
    /// Harness seed
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Engine endpoint
    #[serde(default)]
    pub engine: EngineEndpoint,
}

fn default_name() -> String {
    BACKEND_NAME.to_string()
}

fn default_device() -> String {
    "cuda".to_string()
}

fn default_seed() -> u64 {
    42
}

impl TrtLlmConfig {
    /// Create a new config with default device, seed and endpoint
    pub fn new(model: impl Into<String>, model_type: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            model: model.into(),
            model_type: model_type.into(),
            device: default_device(),
            seed: default_seed(),
            engine: EngineEndpoint::default(),
        }
    }

    /// Set the engine endpoint
    pub fn with_engine(mut self, engine: EngineEndpoint) -> Self {
        self.engine = engine;
        self
    }

    /// Set the engine base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.engine.base_url = base_url.into();
        self
    }

    /// Set the engine API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.engine.api_key = Some(api_key.into());
        self
    }

    /// Set the device label
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set the harness seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            });
        }

        if self.model_type.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "model_type".to_string(),
            });
        }

        let base_url = &self.engine.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "engine.base_url".to_string(),
                value: base_url.clone(),
            });
        }

        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = TrtLlmConfig::new("meta-llama/Llama-3.1-8B", "llama");

        assert_eq!(config.name, BACKEND_NAME);
        assert_eq!(config.device, "cuda");
        assert_eq!(config.seed, 42);
        assert_eq!(config.engine, EngineEndpoint::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: TrtLlmConfig =
            serde_json::from_str(r#"{"model": "gpt2", "model_type": "gpt2"}"#).unwrap();

        assert_eq!(config, TrtLlmConfig::new("gpt2", "gpt2"));
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let config = TrtLlmConfig::new("  ", "llama");

        match config.validate() {
            Err(ConfigError::MissingField { field }) => assert_eq!(field, "model"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = TrtLlmConfig::new("gpt2", "gpt2").with_base_url("localhost:8000");

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "engine.base_url"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = TrtLlmConfig::new("gpt2", "gpt2");
        config.engine.timeout_secs = 0;

        assert!(config.validate().is_err());
    }
}
