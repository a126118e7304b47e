//! # trtbench CLI
//!
//! Benchmark harness for the TensorRT-LLM backend.
//!
//! ## Usage
//!
//! - `trtbench run --model <id> --model-type llama` - Run the inference scenario
//! - `trtbench models` - Show supported model types
//! - `trtbench show report.json` - Print a saved report

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod scenario;

use commands::{models_command, run_command, show_command};
use config::CliConfigLoader;
use scenario::ScenarioSettings;

/// trtbench - benchmark TensorRT-LLM models
#[derive(Parser)]
#[command(name = "trtbench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Benchmark TensorRT-LLM models through a uniform backend interface")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretrained model identifier override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Model type override (see `trtbench models`)
    #[arg(long, global = true)]
    model_type: Option<String>,

    /// Engine base URL override
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Engine API key override
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the inference scenario
    Run(RunArgs),

    /// Show supported model types
    Models,

    /// Print a saved report
    Show {
        /// Report file written by `run --output`
        path: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Number of sequences per call
    #[arg(long, default_value_t = 1)]
    batch_size: usize,

    /// Prompt length in tokens
    #[arg(long, default_value_t = 128)]
    sequence_length: usize,

    /// Upper bound of random token ids
    #[arg(long, default_value_t = 32000)]
    vocab_size: u32,

    /// Tokens to generate in the generate phase
    #[arg(long, default_value_t = 64)]
    new_tokens: u32,

    /// Measured calls per phase
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Unmeasured generate calls before measuring
    #[arg(long, default_value_t = 2)]
    warmup: usize,

    /// Extra generation options as a JSON object
    #[arg(long)]
    kwargs: Option<String>,

    /// Write the report as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hide progress bars
    #[arg(long)]
    no_progress: bool,
}

impl RunArgs {
    fn settings(&self) -> ScenarioSettings {
        ScenarioSettings {
            batch_size: self.batch_size,
            sequence_length: self.sequence_length,
            vocab_size: self.vocab_size,
            new_tokens: self.new_tokens,
            iterations: self.iterations,
            warmup_runs: self.warmup,
            show_progress: !self.no_progress,
            ..ScenarioSettings::default()
        }
    }
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(model_type) = &cli.model_type {
        loader = loader.with_model_type_override(model_type.clone());
    }

    if let Some(endpoint) = &cli.endpoint {
        loader = loader.with_endpoint_override(endpoint.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    trtbench_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command {
        Commands::Run(args) => {
            let settings = args.settings();
            run_command(config_loader, settings, args.kwargs, args.output).await
        }
        Commands::Models => models_command().await,
        Commands::Show { path } => show_command(path).await,
    }
}
