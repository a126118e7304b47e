//! Inference scenario: load once, then time prefill and full generation

pub mod latency;
pub mod report;

pub use latency::{LatencyStats, LatencyTracker};
pub use report::BenchmarkReport;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use trtbench_core::{Backend, BackendInputs, GenerationKwargs, RequestOutput};

/// Shape and repetition settings of a scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSettings {
    pub batch_size: usize,
    pub sequence_length: usize,
    pub vocab_size: u32,
    pub new_tokens: u32,
    pub iterations: usize,
    pub warmup_runs: usize,
    pub seed: u64,
    /// Options shared by every call, token bounds are set per phase
    pub kwargs: GenerationKwargs,
    #[serde(skip)]
    pub show_progress: bool,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            batch_size: 1,
            sequence_length: 128,
            vocab_size: 32000,
            new_tokens: 64,
            iterations: 10,
            warmup_runs: 2,
            seed: 42,
            kwargs: GenerationKwargs::default(),
            show_progress: true,
        }
    }
}

impl ScenarioSettings {
    /// Prefill produces exactly one token
    pub fn prefill_kwargs(&self) -> GenerationKwargs {
        self.kwargs.clone().with_new_tokens(1)
    }

    pub fn generate_kwargs(&self) -> GenerationKwargs {
        self.kwargs.clone().with_new_tokens(i64::from(self.new_tokens))
    }
}

/// Raw measurements of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub load_seconds: f64,
    pub prefill: LatencyStats,
    pub generate: LatencyStats,
    /// Tokens reported by the engine for the last generate call, `None`
    /// when the engine gave no per-prompt counts
    pub generated_tokens: Option<usize>,
}

impl ScenarioResult {
    /// Time spent after the first token
    pub fn decode_latency(&self) -> f64 {
        (self.generate.mean - self.prefill.mean).max(0.0)
    }

    /// Prompt tokens processed per second during prefill
    pub fn prefill_throughput(&self, settings: &ScenarioSettings) -> f64 {
        per_second(
            (settings.batch_size * settings.sequence_length) as f64,
            self.prefill.mean,
        )
    }

    /// Tokens generated per second after the first one
    pub fn decode_throughput(&self, settings: &ScenarioSettings) -> f64 {
        let decoded = settings.batch_size as f64 * f64::from(settings.new_tokens.saturating_sub(1));
        per_second(decoded, self.decode_latency())
    }
}

fn per_second(amount: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        amount / seconds
    } else {
        0.0
    }
}

/// Drives a backend through load, warmup, prefill and generate phases
pub struct InferenceScenario {
    settings: ScenarioSettings,
}

impl InferenceScenario {
    pub fn new(settings: ScenarioSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScenarioSettings {
        &self.settings
    }

    pub async fn run<B: Backend + ?Sized>(&self, backend: &mut B) -> Result<ScenarioResult> {
        let settings = &self.settings;

        info!("Loading {} backend", backend.name());
        let load_started = Instant::now();
        backend.load().await?;
        let load_seconds = load_started.elapsed().as_secs_f64();
        info!("Backend loaded in {:.2}s", load_seconds);

        let inputs = BackendInputs::random(
            settings.batch_size,
            settings.sequence_length,
            settings.vocab_size,
            settings.seed,
        );
        let prefill_kwargs = settings.prefill_kwargs();
        let generate_kwargs = settings.generate_kwargs();

        info!("Warming up with {} generate call(s)", settings.warmup_runs);
        for _ in 0..settings.warmup_runs {
            backend.generate(&inputs, &generate_kwargs).await?;
        }

        info!("Measuring prefill latency");
        let progress = self.progress_bar("prefill")?;
        let mut prefill = LatencyTracker::new();
        for _ in 0..settings.iterations {
            let started = prefill.start();
            backend.prefill(&inputs, &prefill_kwargs).await?;
            prefill.stop(started);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("Measuring generate latency");
        let progress = self.progress_bar("generate")?;
        let mut generate = LatencyTracker::new();
        let mut generated_tokens = None;
        for _ in 0..settings.iterations {
            let started = generate.start();
            let outputs = backend.generate(&inputs, &generate_kwargs).await?;
            generate.stop(started);
            generated_tokens = outputs.iter().map(RequestOutput::generated_tokens).sum();
            progress.inc(1);
        }
        progress.finish_and_clear();
        debug!("Last generate call produced {:?} token(s)", generated_tokens);

        Ok(ScenarioResult {
            load_seconds,
            prefill: prefill.stats(),
            generate: generate.stats(),
            generated_tokens,
        })
    }

    fn progress_bar(&self, phase: &str) -> Result<ProgressBar> {
        if !self.settings.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let progress = ProgressBar::new(self.settings.iterations as u64);
        progress.set_style(ProgressStyle::with_template(
            "{prefix:>8} [{bar:30}] {pos}/{len} {elapsed_precise}",
        )?);
        progress.set_prefix(phase.to_string());
        Ok(progress)
    }
}
