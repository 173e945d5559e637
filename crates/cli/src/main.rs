// toolbench runner
//
// Design Decision: Use clap derive for argument parsing; env vars are read
// through clap so `--help` documents them.
// Design Decision: All configuration is resolved into a RunConfig before
// anything runs; `run` takes it by value and touches no process globals.
// Design Decision: Logs go to stderr so stdout carries only final answers.

mod args;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::SampleIds;
use toolbench_core::{
    run_samples, DriverMode, HarnessError, JsonlTurnLogger, RunConfig, ToolRegistry,
    DEFAULT_MAX_TOOL_ROUNDS,
};
use toolbench_openai::{ModelEndpoint, OpenAiClient};

#[derive(Parser, Debug)]
#[command(name = "run")]
#[command(about = "Drive a model through scripted tool-calling conversations and log every turn")]
#[command(version)]
pub struct Cli {
    /// YAML file with the conversations to run
    pub conversations_file: PathBuf,

    /// Model name passed to the API
    pub model: String,

    /// How the model is told about tools: responses, chat_tools or system_prompt
    #[arg(long, value_parser = args::parse_mode, default_value_t = DriverMode::ChatTools)]
    pub mode: DriverMode,

    /// Comma-separated 1-based sample indices to run, e.g. 1,3,4
    #[arg(long, value_parser = args::parse_samples)]
    pub samples: Option<SampleIds>,

    /// Directory for the conversation log
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum tool-execution rounds per turn
    #[arg(long, default_value_t = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_tool_rounds: usize,

    /// API key for the model endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,
}

impl Cli {
    /// Resolve the arguments into a run configuration
    pub fn into_config(self) -> toolbench_core::Result<RunConfig> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                HarnessError::config("OPENAI_API_KEY is not set; export it or add it to a .env file")
            })?;

        let mut config = RunConfig::new(self.conversations_file, self.model, api_key);
        config.mode = self.mode;
        config.samples = self.samples.map(SampleIds::into_inner);
        config.base_url = self.base_url.filter(|url| !url.trim().is_empty());
        config.output_dir = self.output_dir;
        config.max_tool_rounds = self.max_tool_rounds;
        Ok(config)
    }
}

/// Run every selected sample; the exit code reflects fatal errors only
pub async fn run(config: RunConfig) -> ExitCode {
    let mut endpoint = ModelEndpoint::new(config.api_key.clone());
    if let Some(base_url) = &config.base_url {
        endpoint = endpoint.with_base_url(base_url.clone());
    }
    let client = OpenAiClient::new(endpoint);
    let registry = ToolRegistry::with_mock_tools();
    let logger = JsonlTurnLogger::for_model(&config.output_dir, &config.model);

    info!(
        model = %config.model,
        mode = %config.mode,
        log = %logger.path().display(),
        "Starting run"
    );

    match run_samples(&config, client, &registry, &logger).await {
        Ok(summary) => {
            info!(
                samples = summary.samples,
                turns = summary.turns,
                log = %logger.path().display(),
                "Run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "run=info,toolbench_core=info,toolbench_openai=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    run(config).await
}
