//! Generation inputs, sampling parameters and engine outputs

pub mod inputs;
pub mod output;
pub mod sampling;

pub use inputs::BackendInputs;
pub use output::{CompletionOutput, FinishReason, RequestOutput};
pub use sampling::{GenerationKwargs, SamplingParams};
