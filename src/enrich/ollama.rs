use serde::{Deserialize, Serialize};

use crate::error::EnrichError;
use crate::screen::screen_model::ScreenSpec;

use super::{EnrichmentRequest, TextEnrichment};

// ============================================================================
// Ollama Backend
// ============================================================================

/// Prompt generation with a local Ollama model.
pub struct OllamaEnrichment {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaEnrichment {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaEnrichment {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }

    pub fn build_prompt(&self, screen: &ScreenSpec) -> String {
        let instances = screen
            .component_instances
            .iter()
            .map(|i| {
                let text = i.instance_props.text.as_deref().unwrap_or("-");
                format!(
                    "  - {} at ({}, {}), text: {}",
                    i.spec_id, i.position.x, i.position.y, text
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let texts = screen
            .elements
            .iter()
            .filter_map(|e| e.content.as_deref())
            .filter(|c| !c.trim().is_empty())
            .take(10)
            .collect::<Vec<_>>()
            .join("; ");

        let join = |set: &std::collections::BTreeSet<String>| {
            if set.is_empty() {
                "none".to_string()
            } else {
                set.iter().cloned().collect::<Vec<_>>().join(", ")
            }
        };

        format!(
r#"You are a senior mobile engineer. Write an implementation prompt for the screen below.

SCREEN:
- Name: {}
- Size: {}x{}
- Design system: {}
- Elements: {}
- Component instances:
{}
- Visible text: {}
- Dependencies: {}
- Permissions: {}

Describe the layout top to bottom, which component to use for each part,
the state the screen needs, and the accessibility requirements. Answer in Markdown."#,
            screen.name,
            screen.dimensions.width,
            screen.dimensions.height,
            screen.design_system.display_name(),
            screen.elements.len(),
            if instances.is_empty() { "  (none)".to_string() } else { instances },
            texts,
            join(&screen.dependencies),
            join(&screen.permissions),
        )
    }
}

impl TextEnrichment for OllamaEnrichment {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<String, EnrichError> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(request.screen_spec),
            stream: false,
        };

        let client = reqwest::blocking::Client::new();
        let response = client.post(&self.endpoint).json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let ollama_response: OllamaResponse = response
            .json()
            .map_err(|e| EnrichError::MalformedResponse(e.to_string()))?;
        let text = ollama_response.response.trim();
        if text.is_empty() {
            return Err(EnrichError::MalformedResponse("empty response".to_string()));
        }
        Ok(text.to_string())
    }
}
