//! Configuration module for trtbench core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{EngineEndpoint, TrtLlmConfig, BACKEND_NAME};
