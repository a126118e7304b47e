//! Inference scenario command

use crate::scenario::{BenchmarkReport, InferenceScenario, ScenarioSettings};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::info;
use trtbench_core::{GenerationKwargs, TrtLlmBackend};

/// Run the inference scenario against the configured model
pub async fn run_command(
    config_loader: crate::config::CliConfigLoader,
    mut settings: ScenarioSettings,
    kwargs_json: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = config_loader.load().await?;
    info!("🤖 Using model: {}", config.model);
    info!("🤖 Using model type: {}", config.model_type);
    info!("🌐 Engine endpoint: {}", config.engine.base_url);

    if let Some(raw) = kwargs_json {
        settings.kwargs = parse_kwargs(&raw)?;
    }
    settings.seed = config.seed;

    let started_at = chrono::Utc::now();
    let mut backend = TrtLlmBackend::new(config.clone())?;
    let loader = backend.loader_name().to_string();

    let scenario = InferenceScenario::new(settings);
    let result = scenario.run(&mut backend).await?;

    let report = BenchmarkReport::new(
        &config,
        &loader,
        started_at,
        scenario.settings().clone(),
        result,
    );
    report.print_summary();

    if let Some(path) = &output {
        report.save(path).await?;
        info!("📄 Report saved to: {}", path.display());
    }

    info!("✅ Scenario completed");

    Ok(())
}

/// Parse `--kwargs` as a JSON object of generation options
fn parse_kwargs(raw: &str) -> Result<GenerationKwargs> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--kwargs must be valid JSON")?;
    let map = value
        .as_object()
        .ok_or_else(|| anyhow!("--kwargs must be a JSON object"))?;

    Ok(GenerationKwargs::from_map(map)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kwargs() {
        let kwargs = parse_kwargs(r#"{"temperature": 0.7, "top_k": 20}"#).unwrap();

        assert_eq!(kwargs.temperature, Some(0.7));
        assert_eq!(kwargs.top_k, Some(20));
        assert_eq!(kwargs.seed, None);
    }

    #[test]
    fn test_parse_kwargs_rejects_non_object() {
        assert!(parse_kwargs("[1, 2]").is_err());
        assert!(parse_kwargs("not json").is_err());
        assert!(parse_kwargs(r#"{"top_k": "many"}"#).is_err());
    }
}
