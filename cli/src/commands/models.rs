//! Model-type listing command

use anyhow::Result;
use colored::Colorize;
use tracing::info;
use trtbench_core::{LoaderRegistry, TrtLlmBackend};

/// Show supported model types and the loader each one selects
pub async fn models_command() -> Result<()> {
    info!("Listing supported model types");

    println!("🧩 Supported model types for the {} backend\n", TrtLlmBackend::NAME);

    let registry = LoaderRegistry::default();
    for model_type in registry.list_model_types() {
        if let Some(loader_name) = registry.loader_name(model_type) {
            println!("📦 {:<10} {}", model_type.bold(), loader_name);
        }
    }

    println!("\n💡 Pick one with --model-type or the \"model_type\" config field.");

    Ok(())
}
