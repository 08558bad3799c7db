//! Optional text enrichment: turning a screen spec into an implementation
//! prompt with an external language model. Every failure degrades to the
//! local fallback prompt.

pub mod client;
pub mod fallback;
pub mod gateway;
pub mod ollama;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::discovery::component_model::ComponentSpec;
use crate::error::EnrichError;
use crate::screen::screen_model::ScreenSpec;

pub use client::HttpEnrichment;
pub use fallback::{fallback_prompt, suggested_packages};
pub use gateway::BearerGate;
pub use ollama::OllamaEnrichment;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest<'a> {
    pub screen_spec: &'a ScreenSpec,
    /// Bearer token presented by the caller. Only gates check it; it is
    /// never serialized.
    #[serde(skip)]
    pub token: Option<&'a str>,
}

impl<'a> EnrichmentRequest<'a> {
    pub fn new(screen_spec: &'a ScreenSpec) -> Self {
        Self {
            screen_spec,
            token: None,
        }
    }

    pub fn with_token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }
}

/// Opaque text-in/text-out enrichment backend.
pub trait TextEnrichment: Send + Sync {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<String, EnrichError>;
}

impl<T: TextEnrichment + ?Sized> TextEnrichment for Arc<T> {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<String, EnrichError> {
        (**self).enrich(request)
    }
}

fn request<'a>(screen: &'a ScreenSpec, token: Option<&'a str>) -> EnrichmentRequest<'a> {
    match token {
        Some(token) => EnrichmentRequest::new(screen).with_token(token),
        None => EnrichmentRequest::new(screen),
    }
}

/// Prompt text for `screen`: its stored prompt when it has one, else a fresh
/// one from `enrichment`, else the local fallback. Backend failures and
/// blank answers fall through to the fallback.
pub fn enrich_or_fallback(
    enrichment: Option<&dyn TextEnrichment>,
    token: Option<&str>,
    screen: &ScreenSpec,
    components: &[ComponentSpec],
) -> String {
    if let Some(prompt) = screen.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
        return prompt.to_string();
    }
    if let Some(backend) = enrichment {
        match backend.enrich(&request(screen, token)) {
            Ok(text) if !text.trim().is_empty() => return text,
            Ok(_) => warn!(screen = %screen.name, "enrichment returned an empty prompt"),
            Err(e) => warn!(screen = %screen.name, error = %e, "enrichment failed, using fallback prompt"),
        }
    }
    fallback_prompt(screen, components)
}

/// Store an enriched prompt on every screen the backend succeeds for,
/// presenting `token` with each request. Screens it fails for keep
/// `prompt: None` and get the fallback at export time. Returns how many
/// screens were enriched.
pub fn enrich_screens(
    enrichment: &dyn TextEnrichment,
    screens: &mut [ScreenSpec],
    token: Option<&str>,
) -> usize {
    let mut enriched = 0;
    for screen in screens.iter_mut() {
        match enrichment.enrich(&request(screen, token)) {
            Ok(text) if !text.trim().is_empty() => {
                screen.prompt = Some(text);
                enriched += 1;
            }
            Ok(_) => warn!(screen = %screen.name, "enrichment returned an empty prompt"),
            Err(e) => warn!(screen = %screen.name, error = %e, "enrichment failed"),
        }
    }
    debug!(enriched, total = screens.len(), "screen enrichment done");
    enriched
}
