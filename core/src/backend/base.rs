//! Base backend trait

use crate::error::Result;
use crate::generation::{BackendInputs, GenerationKwargs, RequestOutput};
use async_trait::async_trait;

/// Uniform interface the benchmarking harness drives
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Materialise the model
    async fn load(&mut self) -> Result<()>;

    /// Whether `load` has completed
    fn is_loaded(&self) -> bool;

    /// Run the prefill phase of a request
    async fn prefill(
        &self,
        inputs: &BackendInputs,
        kwargs: &GenerationKwargs,
    ) -> Result<Vec<RequestOutput>>;

    /// Run a full generation
    async fn generate(
        &self,
        inputs: &BackendInputs,
        kwargs: &GenerationKwargs,
    ) -> Result<Vec<RequestOutput>>;
}
