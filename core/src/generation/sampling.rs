//! Keyword options and the engine's native sampling parameters

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Generation options supplied by the harness.
///
/// Every field is optional; absent fields fall back to the defaults of
/// [`SamplingParams`]. Unknown keys are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationKwargs {
    /// Minimum number of new tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_new_tokens: Option<i64>,
    /// Maximum number of new tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<i64>,
    /// Repetition penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    /// Length penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_penalty: Option<f32>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k cutoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Random seed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationKwargs {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a JSON keyword mapping
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(map.clone()))?)
    }

    /// Set both token bounds to the same value
    pub fn with_new_tokens(mut self, new_tokens: i64) -> Self {
        self.min_new_tokens = Some(new_tokens);
        self.max_new_tokens = Some(new_tokens);
        self
    }

    pub fn with_min_new_tokens(mut self, min_new_tokens: i64) -> Self {
        self.min_new_tokens = Some(min_new_tokens);
        self
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: i64) -> Self {
        self.max_new_tokens = Some(max_new_tokens);
        self
    }

    pub fn with_repetition_penalty(mut self, repetition_penalty: f32) -> Self {
        self.repetition_penalty = Some(repetition_penalty);
        self
    }

    pub fn with_length_penalty(mut self, length_penalty: f32) -> Self {
        self.length_penalty = Some(length_penalty);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Sampling parameters in the shape the inference engine expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Minimum number of generated tokens, `-1` lets the engine decide
    pub min_tokens: i64,
    /// Maximum number of generated tokens, `-1` lets the engine decide
    pub max_tokens: i64,
    pub repetition_penalty: f32,
    pub length_penalty: f32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub seed: u64,
}

impl SamplingParams {
    pub const DEFAULT_MIN_TOKENS: i64 = -1;
    pub const DEFAULT_MAX_TOKENS: i64 = -1;
    pub const DEFAULT_REPETITION_PENALTY: f32 = 1.0;
    pub const DEFAULT_LENGTH_PENALTY: f32 = 1.0;
    pub const DEFAULT_TEMPERATURE: f32 = 1.0;
    pub const DEFAULT_TOP_P: f32 = 1.0;
    pub const DEFAULT_TOP_K: u32 = 50;
    pub const DEFAULT_SEED: u64 = 42;

    /// Translate harness options, defaulting each absent field on its own
    pub fn from_kwargs(kwargs: &GenerationKwargs) -> Self {
        Self {
            min_tokens: kwargs.min_new_tokens.unwrap_or(Self::DEFAULT_MIN_TOKENS),
            max_tokens: kwargs.max_new_tokens.unwrap_or(Self::DEFAULT_MAX_TOKENS),
            repetition_penalty: kwargs
                .repetition_penalty
                .unwrap_or(Self::DEFAULT_REPETITION_PENALTY),
            length_penalty: kwargs.length_penalty.unwrap_or(Self::DEFAULT_LENGTH_PENALTY),
            temperature: kwargs.temperature.unwrap_or(Self::DEFAULT_TEMPERATURE),
            top_p: kwargs.top_p.unwrap_or(Self::DEFAULT_TOP_P),
            top_k: kwargs.top_k.unwrap_or(Self::DEFAULT_TOP_K),
            seed: kwargs.seed.unwrap_or(Self::DEFAULT_SEED),
        }
    }

    /// Minimum token count, `None` when left to the engine
    pub fn min_tokens_limit(&self) -> Option<u32> {
        u32::try_from(self.min_tokens).ok()
    }

    /// Maximum token count, `None` when left to the engine
    pub fn max_tokens_limit(&self) -> Option<u32> {
        u32::try_from(self.max_tokens).ok()
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from_kwargs(&GenerationKwargs::default())
    }
}

impl From<&GenerationKwargs> for SamplingParams {
    fn from(kwargs: &GenerationKwargs) -> Self {
        Self::from_kwargs(kwargs)
    }
}
