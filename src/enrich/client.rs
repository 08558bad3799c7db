use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::EnrichError;

use super::{EnrichmentRequest, TextEnrichment};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Remote prompt service: `POST {screenSpec}` with a bearer token, answering
/// either `{"prompt": "..."}` or plain text.
pub struct HttpEnrichment {
    pub endpoint: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl HttpEnrichment {
    pub fn new(endpoint: &str, token: &str) -> Result<Self, EnrichError> {
        Self::with_timeout(endpoint, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, EnrichError> {
        if endpoint.is_empty() || token.is_empty() {
            return Err(EnrichError::NotConfigured);
        }
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            client,
        })
    }
}

impl TextEnrichment for HttpEnrichment {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<String, EnrichError> {
        debug!(endpoint = %self.endpoint, screen = %request.screen_spec.name, "requesting prompt");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(EnrichError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_prompt(&body)
    }
}

/// Accepts `{"prompt": "..."}`, a bare JSON string, or plain text.
pub fn parse_prompt(body: &str) -> Result<String, EnrichError> {
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => match obj.get("prompt") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(EnrichError::MalformedResponse(
                    "expected a \"prompt\" string".to_string(),
                ));
            }
        },
        Ok(Value::String(s)) => s,
        _ => body.to_string(),
    };

    if text.trim().is_empty() {
        return Err(EnrichError::MalformedResponse("empty prompt".to_string()));
    }
    Ok(text)
}
