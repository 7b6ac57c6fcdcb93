use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ollama connection error: {0}")]
    ModelConnection(String),

    #[error("Ollama response decode error: {0}")]
    ModelDecode(String),

    #[error("Ollama returned invalid response format")]
    ModelResponseFormat,

    #[error("Failed to parse valid tool JSON from Ollama response")]
    ToolParse,

    #[error("Invalid tool call: {0}")]
    InvalidTool(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
