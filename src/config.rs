use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::{AgentError, AgentResult};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full URL of the Ollama `/api/generate` endpoint.
    pub api_url: String,
    pub model: String,
    /// Upper bound for a single generate call.
    pub timeout_secs: u64,
    /// Upper bound for the model listing used by `/models` and the startup probe.
    pub probe_timeout_secs: u64,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    /// Ask Ollama to constrain output to JSON.
    pub json_mode: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:11434/api/generate".into(),
            model: "phi4:mini".into(),
            timeout_secs: 90,
            probe_timeout_secs: 5,
            temperature: 0.1,
            top_p: 0.9,
            max_tokens: 1000,
            json_mode: true,
        }
    }
}

/// Caps applied to the snapshot before it is embedded in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub max_snapshot_nodes: usize,
    pub max_snapshot_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_snapshot_nodes: 120,
            max_snapshot_chars: 60_000,
        }
    }
}

/// Model name and endpoint, mutable at runtime through `POST /settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(rename = "ollama_model")]
    pub model: String,
    #[serde(rename = "ollama_url")]
    pub api_url: String,
}

pub type SharedSettings = Arc<RwLock<ModelSettings>>;

impl AppConfig {
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.llm.model.clone(),
            api_url: self.llm.api_url.clone(),
        }
    }

    pub fn shared_settings(&self) -> SharedSettings {
        Arc::new(RwLock::new(self.model_settings()))
    }

    /// Apply `CLUELY_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> AgentResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank("CLUELY_OLLAMA_URL") {
            self.llm.api_url = url;
        }
        if let Some(model) = non_blank("CLUELY_OLLAMA_MODEL") {
            self.llm.model = model;
        }
        if let Some(host) = non_blank("CLUELY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_blank("CLUELY_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| AgentError::Config(format!("CLUELY_PORT={port}: {e}")))?;
        }
        Ok(())
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    let candidate = dirs::config_dir()?.join("cluely-lite").join(CONFIG_FILE_NAME);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in user config directory");
        return Some(candidate);
    }

    None
}

pub fn load_config_from(path: &Path) -> AgentResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), model = %config.llm.model, "config loaded");
    Ok(config)
}

/// Load the config file (explicit path first, then the usual locations) and
/// layer environment overrides on top. A missing file yields defaults; an
/// explicit path that does not exist is an error.
pub fn load_config(explicit: Option<&Path>) -> AgentResult<AppConfig> {
    let mut config = match explicit {
        Some(path) if !path.exists() => {
            return Err(AgentError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        Some(path) => load_config_from(path)?,
        None => match resolve_config_path() {
            Some(path) => load_config_from(&path)?,
            None => {
                tracing::debug!("no config.toml found; using built-in defaults");
                AppConfig::default()
            }
        },
    };
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}
