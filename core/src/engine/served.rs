//! Loader and model backed by a TensorRT-LLM OpenAI-compatible server

use crate::config::EngineEndpoint;
use crate::engine::{LoadRequest, ModelLoader, PretrainedModel};
use crate::error::{EngineError, Result};
use crate::generation::{CompletionOutput, FinishReason, RequestOutput, SamplingParams};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Loader for one model architecture served by `trtllm-serve`
pub struct ServedModelLoader {
    architecture: &'static str,
}

impl ServedModelLoader {
    pub fn new(architecture: &'static str) -> Self {
        Self { architecture }
    }

    /// Check a local checkpoint's `config.json` against the configured model type
    async fn check_local_checkpoint(&self, request: &LoadRequest<'_>) -> Result<()> {
        let config_path = match local_config_path(request.model) {
            Some(path) => path,
            None => return Ok(()),
        };

        debug!("Reading checkpoint config {}", config_path.display());
        let content = tokio::fs::read_to_string(&config_path).await?;
        let checkpoint: CheckpointConfig = serde_json::from_str(&content)?;

        if let Some(found) = checkpoint.model_type {
            if found != request.model_type {
                return Err(EngineError::ArchitectureMismatch {
                    model: request.model.to_string(),
                    expected: request.model_type.to_string(),
                    found,
                }
                .into());
            }
        }

        if !checkpoint.architectures.is_empty()
            && !checkpoint.architectures.iter().any(|a| a == self.architecture)
        {
            warn!(
                "Checkpoint architectures {:?} do not include {}",
                checkpoint.architectures, self.architecture
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ModelLoader for ServedModelLoader {
    fn loader_name(&self) -> &str {
        self.architecture
    }

    async fn from_pretrained(&self, request: &LoadRequest<'_>) -> Result<Box<dyn PretrainedModel>> {
        self.check_local_checkpoint(request).await?;

        let model = ServedModel::new(request.model, request.endpoint)?;
        info!("\t+ {} bound to {}", self.architecture, model.completions_url);

        Ok(Box::new(model))
    }
}

/// Resolve `<model>/config.json` when `model` names a local directory
fn local_config_path(model: &str) -> Option<PathBuf> {
    let expanded = shellexpand::tilde(model);
    let dir = Path::new(&*expanded);
    let config_path = dir.join("config.json");

    if dir.is_dir() && config_path.is_file() {
        Some(config_path)
    } else {
        None
    }
}

/// The subset of a Hugging Face `config.json` the loader inspects
#[derive(Debug, Deserialize)]
struct CheckpointConfig {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    architectures: Vec<String>,
}

/// A model served over the `/v1/completions` endpoint
pub struct ServedModel {
    client: Client,
    model: String,
    completions_url: String,
    api_key: Option<String>,
}

impl ServedModel {
    /// Create a client for `model` on the given endpoint
    pub fn new(model: &str, endpoint: &EngineEndpoint) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            model: model.to_string(),
            completions_url: format!("{}/v1/completions", endpoint.base_url.trim_end_matches('/')),
            api_key: endpoint.api_key.clone(),
        })
    }

    fn build_request<'a>(
        &'a self,
        prompts: &'a [Vec<u32>],
        params: &SamplingParams,
    ) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            prompt: prompts,
            min_tokens: params.min_tokens_limit(),
            max_tokens: params.max_tokens_limit(),
            repetition_penalty: params.repetition_penalty,
            length_penalty: params.length_penalty,
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            seed: params.seed,
        }
    }
}

#[async_trait]
impl PretrainedModel for ServedModel {
    async fn generate(
        &self,
        prompts: Vec<Vec<u32>>,
        params: &SamplingParams,
    ) -> Result<Vec<RequestOutput>> {
        let request = self.build_request(&prompts, params);
        debug!(
            "POST {} with {} prompt(s), max_tokens={:?}",
            self.completions_url,
            prompts.len(),
            request.max_tokens
        );

        let mut builder = self.client.post(&self.completions_url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| EngineError::Network {
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status,
                message: error_text,
            }
            .into());
        }

        let completion: CompletionResponse =
            response.json().await.map_err(|e| EngineError::Network {
                message: format!("Failed to parse response: {}", e),
            })?;

        convert_response(prompts, completion)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Map the server's choices back onto the submitted prompts
fn convert_response(
    prompts: Vec<Vec<u32>>,
    response: CompletionResponse,
) -> Result<Vec<RequestOutput>> {
    if response.choices.len() != prompts.len() {
        return Err(EngineError::InvalidResponse {
            message: format!(
                "expected {} choices, got {}",
                prompts.len(),
                response.choices.len()
            ),
        }
        .into());
    }

    let mut choices = response.choices;
    choices.sort_by_key(|choice| choice.index);

    // Per-choice counts are only recoverable when there is a single prompt
    let single_count = match (&response.usage, prompts.len()) {
        (Some(usage), 1) => Some(usage.completion_tokens),
        _ => None,
    };

    prompts
        .into_iter()
        .zip(choices)
        .enumerate()
        .map(|(request_id, (prompt_token_ids, choice))| -> Result<RequestOutput> {
            if choice.index != request_id {
                return Err(EngineError::InvalidResponse {
                    message: format!("missing choice for prompt {}", request_id),
                }
                .into());
            }

            Ok(RequestOutput {
                request_id,
                prompt_token_ids,
                outputs: vec![CompletionOutput {
                    index: 0,
                    text: choice.text,
                    token_ids: choice.token_ids.unwrap_or_default(),
                    num_tokens: single_count,
                    finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
                }],
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a [Vec<u32>],
    #[serde(skip_serializing_if = "Option::is_none")]
    min_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    repetition_penalty: f32,
    length_penalty: f32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    index: usize,
    #[serde(default)]
    text: String,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    token_ids: Option<Vec<u32>>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    completion_tokens: u32,
}
