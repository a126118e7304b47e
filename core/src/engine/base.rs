//! Traits at the seam between the backend and the inference engine

use crate::config::EngineEndpoint;
use crate::error::Result;
use crate::generation::{RequestOutput, SamplingParams};
use async_trait::async_trait;
use std::path::Path;

/// A model materialised by the engine and ready to generate
#[async_trait]
pub trait PretrainedModel: Send + Sync {
    /// Generate continuations for each prompt, returned in prompt order
    async fn generate(
        &self,
        prompts: Vec<Vec<u32>>,
        params: &SamplingParams,
    ) -> Result<Vec<RequestOutput>>;

    /// Identifier of the loaded model
    fn model_id(&self) -> &str;
}

/// Engine component that builds a runnable model from a pretrained identifier
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Name of the engine model class this loader produces
    fn loader_name(&self) -> &str;

    /// Load the pretrained model described by `request`
    async fn from_pretrained(&self, request: &LoadRequest<'_>) -> Result<Box<dyn PretrainedModel>>;
}

/// Everything a loader needs to materialise a model
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    /// Pretrained model identifier
    pub model: &'a str,

    /// Model-type label the loader was selected for
    pub model_type: &'a str,

    /// Engine endpoint
    pub endpoint: &'a EngineEndpoint,

    /// Scratch directory, only valid for the duration of the load
    pub workdir: &'a Path,
}
