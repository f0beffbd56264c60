/*
postlens - single-binary main.rs
This binary wires the pipeline clients together from configuration and starts
the Rocket HTTP server.
*/

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use postlens::llm::remote::RemoteLlmProvider;
use postlens::llm::LlmProvider;
use postlens::oembed::{OembedClient, DEFAULT_OEMBED_URL};
use postlens::pipeline::PostWorkflow;
use postlens::server::{launch_rocket, AppState};
use postlens::sheets::{SheetsClient, DEFAULT_RANGE, DEFAULT_SHEETS_API_URL};

#[derive(Parser, Debug)]
#[command(name = "postlens", about = "PostLens single-binary server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() {
            Some(&default_path)
        } else {
            None
        },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let config = Arc::new(config);

    // oEmbed client for the content fetch stage
    let embed = OembedClient::new(
        config
            .source
            .oembed_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OEMBED_URL.to_string()),
    )
    .with_timeout(config.source.fetch_timeout_seconds.unwrap_or(10));

    // LLM providers (task-specific config with fallback to [llm.remote])
    let llm_config = config
        .llm
        .as_ref()
        .context("missing [llm] configuration")?;
    let sentiment_llm = create_llm_provider(llm_config, LlmTask::Sentiment)?;
    let summary_llm = create_llm_provider(llm_config, LlmTask::Summary)?;
    info!("LLM providers initialized");

    // Sheets client for the persistence stage
    let sheet_cfg = &config.sheet;
    let token_env = sheet_cfg
        .api_token_env
        .as_deref()
        .context("missing sheet.api_token_env in config")?;
    let token = std::env::var(token_env)
        .with_context(|| format!("sheet API token env var '{}' not set", token_env))?;
    let sink = SheetsClient::new(
        sheet_cfg
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SHEETS_API_URL.to_string()),
        token,
        sheet_cfg.spreadsheet_id.clone(),
        sheet_cfg
            .range
            .clone()
            .unwrap_or_else(|| DEFAULT_RANGE.to_string()),
    )
    .with_timeout(sheet_cfg.timeout_seconds.unwrap_or(10));

    let workflow = PostWorkflow::new(
        Arc::new(embed),
        Arc::from(sentiment_llm),
        Arc::from(summary_llm),
        Arc::new(sink),
        config.source.allowed_prefixes.clone(),
    );

    let state = AppState {
        started_at: Utc::now(),
        config: config.clone(),
        workflow: Arc::new(workflow),
    };

    // Launch the Rocket server (blocking until Rocket shuts down)
    info!("Launching Rocket HTTP server");
    launch_rocket(state).await
}

/// LLM task for selecting the matching configuration section
#[derive(Debug, Clone, Copy)]
enum LlmTask {
    Sentiment, // short label, near-deterministic
    Summary,   // short free text, some creativity
}

/// Create an LLM provider based on configuration and task
fn create_llm_provider(
    llm_config: &common::LlmConfig,
    task: LlmTask,
) -> Result<Box<dyn LlmProvider>> {
    let adapter = llm_config.adapter.as_deref().unwrap_or("none");
    match adapter {
        "remote" => {
            // Choose config based on task
            let endpoint_config = match task {
                LlmTask::Sentiment => llm_config.sentiment.as_ref().or(llm_config.remote.as_ref()),
                LlmTask::Summary => llm_config.summary.as_ref().or(llm_config.remote.as_ref()),
            };

            let remote_config = endpoint_config.ok_or_else(|| {
                anyhow::anyhow!("Remote adapter selected but no LLM config found for task {:?}", task)
            })?;

            // Fetch API key from env var
            let api_key_env = remote_config
                .api_key_env
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Missing api_key_env in remote config"))?;

            let api_key = std::env::var(api_key_env)
                .with_context(|| format!("LLM API key env var '{}' not set", api_key_env))?;

            let model = remote_config
                .model
                .clone()
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string());
            let api_url = remote_config
                .api_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string());
            let timeout_secs = remote_config.timeout_seconds.unwrap_or(30);
            let max_tokens = remote_config.max_tokens.unwrap_or(100);

            let provider = RemoteLlmProvider::new(api_url, api_key, model).with_defaults(
                timeout_secs,
                max_tokens,
                0.7,
            );
            Ok(Box::new(provider))
        }
        "none" => {
            anyhow::bail!("LLM adapter 'none' cannot serve analysis requests")
        }
        _ => anyhow::bail!("Unknown LLM adapter type: {}", adapter),
    }
}
