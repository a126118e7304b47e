//! Benchmark backends and the model-type loader registry

pub mod base;
pub mod registry;
pub mod tensorrt_llm;

pub use base::Backend;
pub use registry::{LoaderFactory, LoaderRegistry};
pub use tensorrt_llm::TrtLlmBackend;
