//! # trtbench Core
//!
//! Core library for trtbench - a TensorRT-LLM backend for LLM benchmarking.
//!
//! A benchmarking harness drives every backend through the same `load`,
//! `prefill` and `generate` calls. This crate provides the TensorRT-LLM
//! adapter, the registry that maps model types to engine loaders, and the
//! translation from harness keyword options to engine sampling parameters.

// Core modules
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;

// Re-export commonly used types
pub use backend::{Backend, LoaderRegistry, TrtLlmBackend};
pub use config::{EngineEndpoint, TrtLlmConfig};
pub use generation::{BackendInputs, GenerationKwargs, RequestOutput, SamplingParams};

/// Current version of the trtbench-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
