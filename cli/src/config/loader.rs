//! CLI configuration loader for trtbench
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./trtbench.json or ./.trtbench/config.json
//! 3. XDG config: $XDG_CONFIG_HOME/trtbench/config.json or ~/.config/trtbench/config.json
//! 4. Environment variables only (no files)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trtbench_core::{EngineEndpoint, TrtLlmConfig};

const CONFIG_FILE_NAME: &str = "trtbench.json";

/// Raw configuration file format, every field optional so flags can fill gaps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Pretrained model identifier
    pub model: Option<String>,
    /// Loader label
    pub model_type: Option<String>,
    /// Device label
    pub device: Option<String>,
    /// Harness seed
    pub seed: Option<u64>,
    /// Engine endpoint settings
    #[serde(default)]
    pub engine: RawEngineConfig,
}

/// Raw engine endpoint section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEngineConfig {
    /// Base URL of the server
    pub base_url: Option<String>,
    /// API key (can be "env:VAR_NAME" for environment variable)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Directory searched instead of the process working directory
    working_dir: Option<PathBuf>,
    /// Directory searched instead of the user config directory
    config_home: Option<PathBuf>,
    /// Flag overrides
    model_override: Option<String>,
    model_type_override: Option<String>,
    endpoint_override: Option<String>,
    api_key_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            working_dir: None,
            config_home: None,
            model_override: None,
            model_type_override: None,
            endpoint_override: None,
            api_key_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Search this directory instead of the current one
    pub fn with_working_dir(mut self, path: PathBuf) -> Self {
        self.working_dir = Some(path);
        self
    }

    /// Search this directory instead of the XDG config home
    pub fn with_config_home(mut self, path: PathBuf) -> Self {
        self.config_home = Some(path);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Set model type override
    pub fn with_model_type_override(mut self, model_type: String) -> Self {
        self.model_type_override = Some(model_type);
        self
    }

    /// Set engine endpoint override
    pub fn with_endpoint_override(mut self, endpoint: String) -> Self {
        self.endpoint_override = Some(endpoint);
        self
    }

    /// Set API key override
    pub fn with_api_key_override(mut self, api_key: String) -> Self {
        self.api_key_override = Some(api_key);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<TrtLlmConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply flag overrides
        if let Some(model) = &self.model_override {
            config.model = Some(model.clone());
        }
        if let Some(model_type) = &self.model_type_override {
            config.model_type = Some(model_type.clone());
        }
        if let Some(endpoint) = &self.endpoint_override {
            config.engine.base_url = Some(endpoint.clone());
        }
        if let Some(api_key) = &self.api_key_override {
            config.engine.api_key = Some(api_key.clone());
        }

        // Step 3: Resolve to final backend config
        self.resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(config);
        }

        if let Some(config) = self.try_load_xdg().await? {
            return Ok(config);
        }

        Ok(self.load_env_only())
    }

    /// Try loading from the working directory
    async fn try_load_cwd(&self) -> Result<Option<RawConfig>> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let config_json = cwd.join(CONFIG_FILE_NAME);
        if config_json.exists() {
            return Ok(Some(self.load_file(&config_json).await?));
        }

        let dir_config = cwd.join(".trtbench").join("config.json");
        if dir_config.exists() {
            return Ok(Some(self.load_file(&dir_config).await?));
        }

        Ok(None)
    }

    /// Try loading from the XDG config directory
    async fn try_load_xdg(&self) -> Result<Option<RawConfig>> {
        if let Some(config_dir) = self.get_config_home() {
            let config_path = config_dir.join("trtbench").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Build a config from environment variables only
    fn load_env_only(&self) -> RawConfig {
        RawConfig {
            model: std::env::var("TRTBENCH_MODEL").ok(),
            model_type: std::env::var("TRTBENCH_MODEL_TYPE").ok(),
            device: None,
            seed: None,
            engine: RawEngineConfig {
                base_url: std::env::var("TRTBENCH_ENDPOINT").ok(),
                api_key: std::env::var("TRTBENCH_API_KEY").ok(),
                timeout_secs: None,
            },
        }
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join(CONFIG_FILE_NAME);
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No {} found in directory: {}",
                    CONFIG_FILE_NAME,
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the user config directory
    fn get_config_home(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.config_home {
            return Some(dir.clone());
        }

        match std::env::var("XDG_CONFIG_HOME") {
            Ok(xdg_config) => Some(PathBuf::from(xdg_config)),
            Err(_) => dirs::config_dir(),
        }
    }

    /// Resolve raw config to TrtLlmConfig
    fn resolve_config(&self, config: RawConfig) -> Result<TrtLlmConfig> {
        let model = config.model.ok_or_else(|| {
            anyhow!("No model configured. Create a trtbench.json file, set TRTBENCH_MODEL or pass --model")
        })?;
        let model_type = config.model_type.ok_or_else(|| {
            anyhow!("No model_type configured. Set it in trtbench.json, TRTBENCH_MODEL_TYPE or --model-type")
        })?;

        // Resolve API key (handle env: prefix)
        let api_key = match config.engine.api_key {
            Some(key) => match key.strip_prefix("env:") {
                Some(var_name) => Some(
                    std::env::var(var_name)
                        .with_context(|| format!("Environment variable not found: {}", var_name))?,
                ),
                None => Some(key),
            },
            None => None,
        };

        let defaults = EngineEndpoint::default();
        let engine = EngineEndpoint {
            base_url: config.engine.base_url.unwrap_or(defaults.base_url),
            api_key,
            timeout_secs: config.engine.timeout_secs.unwrap_or(defaults.timeout_secs),
        };

        let mut resolved = TrtLlmConfig::new(model, model_type).with_engine(engine);
        if let Some(device) = config.device {
            resolved = resolved.with_device(device);
        }
        if let Some(seed) = config.seed {
            resolved = resolved.with_seed(seed);
        }

        resolved
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(resolved)
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
