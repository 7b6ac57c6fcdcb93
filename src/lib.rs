pub mod agent_engine;
pub mod commands;
pub mod config;
pub mod errors;
pub mod llm;
pub mod perception;
pub mod server;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::agent_engine::engine::Planner;
use crate::config::AppConfig;
use crate::errors::AgentResult;
use crate::llm::providers::ollama::OllamaProvider;
use crate::server::{Server, ServerState};

#[derive(Parser, Debug)]
#[command(name = "cluely-lite", version, about = "Local desktop automation planner backed by Ollama")]
pub struct Cli {
    /// Path to config.toml (defaults to the usual search locations).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listen address; overrides config and CLUELY_HOST.
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port; overrides config and CLUELY_PORT.
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Build the shared server state (planner + Ollama client) from config.
pub fn build_state(config: &AppConfig) -> AgentResult<Arc<ServerState>> {
    let provider = Arc::new(OllamaProvider::from_config(&config.llm)?);
    let planner = Planner::new(
        provider,
        config.shared_settings(),
        config.llm.clone(),
        config.prompt.clone(),
    );
    Ok(Arc::new(ServerState::new(planner)))
}

pub async fn run(cli: Cli) -> AgentResult<()> {
    init_tracing();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let mut config = config::load_config(cli.config.as_deref())?;
    cli.apply(&mut config);

    let state = build_state(&config)?;

    let models = state.planner.available_models().await;
    if models.is_empty() {
        tracing::warn!(url = %config.llm.api_url, "Ollama not detected (or no models installed)");
        tracing::warn!("server will run in fallback mode");
    } else {
        tracing::info!(url = %config.llm.api_url, models = ?models, "Ollama is running");
    }

    let server = Server::start(state, &config.server.host, config.server.port).await?;
    tracing::info!(addr = %server.addr(), "Cluely-Lite agent server started");
    tracing::info!(model = %config.llm.model, url = %config.llm.api_url, "model settings");
    tracing::info!(r#"use POST /command with JSON {{"instruction":"<text>"}}"#);
    tracing::info!("press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
    tracing::info!("shutting down server");
    server.shutdown().await
}
