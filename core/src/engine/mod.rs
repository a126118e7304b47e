//! Inference engine abstractions and the served-engine implementation

pub mod base;
pub mod served;

pub use base::{LoadRequest, ModelLoader, PretrainedModel};
pub use served::{ServedModel, ServedModelLoader};
