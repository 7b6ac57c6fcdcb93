use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::agent_engine::state::PlanResult;
use crate::config::ModelSettings;
use crate::llm::tools::ToolCall;
use crate::perception::SnapshotNode;
use crate::server::error::ApiError;
use crate::server::ServerState;

const INSTRUCTION_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub snapshot: Option<Vec<SnapshotNode>>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: f64,
    pub requests_processed: u64,
    pub started_at: DateTime<Utc>,
    pub ollama_url: String,
    pub ollama_model: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub ollama_model: Option<String>,
    #[serde(default)]
    pub ollama_url: Option<String>,
}

/// Plan one action. Always 200 with a tool unless the request is malformed
/// (400) or the planner itself faults (500 with an `answer` tool).
pub async fn command(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_no = state.requests.fetch_add(1, Ordering::Relaxed) + 1;

    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid JSON payload: {}", e.body_text())))?;
    let instruction = request.instruction.trim().to_string();
    if instruction.is_empty() {
        return Err(ApiError::bad_request(
            "Field 'instruction' must be a non-empty string",
        ));
    }
    let snapshot = request.snapshot.unwrap_or_default();
    let model = request.model;

    let span = tracing::info_span!(
        "command",
        request = request_no,
        request_id = %uuid::Uuid::new_v4()
    );

    async move {
        let preview: String = instruction.chars().take(INSTRUCTION_PREVIEW_CHARS).collect();
        tracing::info!(instruction = %preview, elements = snapshot.len(), "processing request");
        let started = Instant::now();

        match state
            .planner
            .plan(&instruction, &snapshot, model.as_deref())
            .await
        {
            Ok(plan) => {
                tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "request completed");
                Ok((StatusCode::OK, Json(plan)).into_response())
            }
            Err(e) => {
                tracing::error!(error = %e, "error processing request");
                let body = PlanResult {
                    response: format!("Error processing request: {e}"),
                    tool: ToolCall::answer(format!("Error: {e}")),
                };
                Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    let settings = state.planner.settings().read().await.clone();
    Json(HealthResponse {
        status: "running",
        uptime_seconds: round2(state.started.elapsed().as_secs_f64()),
        requests_processed: state.requests.load(Ordering::Relaxed),
        started_at: state.started_at,
        ollama_url: settings.api_url,
        ollama_model: settings.model,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn status_text(State(state): State<Arc<ServerState>>) -> String {
    let settings = state.planner.settings().read().await.clone();
    format!(
        "Cluely-Lite Agent Server\n\
         Status: Running\n\
         Uptime: {:.1} seconds\n\
         Requests: {}\n\
         Ollama: {} at {}\n\
         \n\
         Use POST /command with JSON {{\"instruction\":\"<text>\",\"snapshot\":[...]}}\n",
        state.started.elapsed().as_secs_f64(),
        state.requests.load(Ordering::Relaxed),
        settings.model,
        settings.api_url,
    )
}

pub async fn models(State(state): State<Arc<ServerState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.planner.available_models().await,
    })
}

pub async fn get_settings(State(state): State<Arc<ServerState>>) -> Json<ModelSettings> {
    Json(state.planner.settings().read().await.clone())
}

/// Partial update; omitted fields keep their value. Not persisted.
pub async fn update_settings(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<ModelSettings>, ApiError> {
    let Json(update) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid JSON payload: {}", e.body_text())))?;

    let model = non_blank("ollama_model", update.ollama_model)?;
    let url = non_blank("ollama_url", update.ollama_url)?;

    let mut settings = state.planner.settings().write().await;
    if let Some(model) = model {
        settings.model = model;
    }
    if let Some(url) = url {
        settings.api_url = url;
    }
    tracing::info!(model = %settings.model, url = %settings.api_url, "settings updated");
    Ok(Json(settings.clone()))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ApiError::bad_request(format!(
            "Field '{field}' must be a non-empty string"
        ))),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_request_defaults() {
        let req: CommandRequest = serde_json::from_str(r#"{"instruction": "Click Save"}"#).unwrap();
        assert_eq!(req.instruction, "Click Save");
        assert!(req.snapshot.is_none());
        assert!(req.model.is_none());

        let req: CommandRequest = serde_json::from_str(r#"{"invalid": "data"}"#).unwrap();
        assert!(req.instruction.is_empty());
    }

    #[test]
    fn command_request_rejects_wrong_types() {
        assert!(serde_json::from_str::<CommandRequest>(r#"{"instruction": 5}"#).is_err());
        assert!(serde_json::from_str::<CommandRequest>(
            r#"{"instruction": "x", "snapshot": {"id": 1}}"#
        )
        .is_err());
    }

    #[test]
    fn blank_settings_fields_are_rejected() {
        assert!(non_blank("ollama_model", Some("  ".into())).is_err());
        assert_eq!(
            non_blank("ollama_model", Some(" qwen2.5:3b ".into())).unwrap().as_deref(),
            Some("qwen2.5:3b")
        );
        assert_eq!(non_blank("ollama_url", None).unwrap(), None);
    }

    #[test]
    fn uptime_rounds_to_hundredths() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2.0), 2.0);
    }
}
