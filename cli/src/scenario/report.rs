//! Benchmark report assembly, printing and persistence

use super::{LatencyStats, ScenarioResult, ScenarioSettings};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use trtbench_core::TrtLlmConfig;

/// Everything recorded about one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub backend: String,
    pub model: String,
    pub model_type: String,
    pub loader: String,
    pub device: String,
    pub settings: ScenarioSettings,
    pub load_seconds: f64,
    pub prefill: LatencyStats,
    pub generate: LatencyStats,
    pub decode_latency: f64,
    pub prefill_throughput: f64,
    pub decode_throughput: f64,
    /// Absent when the engine reported no per-prompt token counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_tokens: Option<usize>,
}

impl BenchmarkReport {
    pub fn new(
        config: &TrtLlmConfig,
        loader: &str,
        started_at: DateTime<Utc>,
        settings: ScenarioSettings,
        result: ScenarioResult,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at,
            backend: config.name.clone(),
            model: config.model.clone(),
            model_type: config.model_type.clone(),
            loader: loader.to_string(),
            device: config.device.clone(),
            decode_latency: result.decode_latency(),
            prefill_throughput: result.prefill_throughput(&settings),
            decode_throughput: result.decode_throughput(&settings),
            load_seconds: result.load_seconds,
            prefill: result.prefill,
            generate: result.generate,
            generated_tokens: result.generated_tokens,
            settings,
        }
    }

    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        println!(
            "\n📊 {} on {} ({} via {})",
            self.model.bold(),
            self.backend,
            self.model_type,
            self.loader
        );
        println!(
            "   shape: batch_size={} sequence_length={} new_tokens={}",
            self.settings.batch_size, self.settings.sequence_length, self.settings.new_tokens
        );
        println!("   load: {:.3}s", self.load_seconds);
        print_latency("prefill", &self.prefill);
        print_latency("generate", &self.generate);
        println!("   decode latency: {:.4}s", self.decode_latency);
        println!(
            "   prefill throughput: {} tokens/s",
            format!("{:.1}", self.prefill_throughput).green()
        );
        println!(
            "   decode throughput: {} tokens/s",
            format!("{:.1}", self.decode_throughput).green()
        );
        match self.generated_tokens {
            Some(tokens) => println!("   generated tokens (last call): {}", tokens),
            None => println!(
                "   generated tokens (last call): {}",
                "not reported by engine".yellow()
            ),
        }
    }

    /// Save the report as pretty JSON
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }

    /// Load a report saved with [`BenchmarkReport::save`]
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read report: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse report: {}", path.display()))
    }
}

fn print_latency(phase: &str, stats: &LatencyStats) {
    println!(
        "   {:<8} mean={:.4}s p50={:.4}s p90={:.4}s p99={:.4}s (n={})",
        phase, stats.mean, stats.p50, stats.p90, stats.p99, stats.count
    );
}
