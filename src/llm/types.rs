use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Body of an Ollama `/api/generate` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub options: SamplingOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub num_predict: u32,
}

impl From<&LlmConfig> for SamplingOptions {
    fn from(cfg: &LlmConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            num_predict: cfg.max_tokens,
        }
    }
}

impl GenerateRequest {
    pub fn new(model: String, prompt: String, cfg: &LlmConfig) -> Self {
        Self {
            model,
            prompt,
            stream: false,
            format: cfg.json_mode.then(|| "json".to_string()),
            options: SamplingOptions::from(cfg),
        }
    }
}

/// `/api/tags` listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateRequest::new(
            "phi4:mini".into(),
            "hi".into(),
            &LlmConfig::default(),
        ))
        .unwrap();
        assert_eq!(body["model"], "phi4:mini");
        assert_eq!(body["stream"], false);
        assert_eq!(body["format"], "json");
        assert_eq!(body["options"]["num_predict"], 1000);
    }

    #[test]
    fn format_omitted_without_json_mode() {
        let cfg = LlmConfig {
            json_mode: false,
            ..LlmConfig::default()
        };
        let body = serde_json::to_value(GenerateRequest::new("m".into(), "p".into(), &cfg)).unwrap();
        assert!(body.get("format").is_none());
    }

    #[test]
    fn tags_tolerate_extra_fields() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"qwen2.5:3b","size":1},{"name":"phi4:mini","digest":"abc"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["qwen2.5:3b", "phi4:mini"]);
    }
}
