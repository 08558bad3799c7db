use sha1::{Digest, Sha1};
use tracing::warn;

use crate::error::EnrichError;

use super::{EnrichmentRequest, TextEnrichment};

/// Rejects requests whose bearer token does not match the configured secret
/// before the wrapped backend does any work.
///
/// Tokens are compared by SHA-1 digest, so the comparison length does not
/// depend on the presented token.
pub struct BearerGate<E> {
    secret_digest: Vec<u8>,
    inner: E,
}

impl<E: TextEnrichment> BearerGate<E> {
    pub fn new(secret: &str, inner: E) -> Result<Self, EnrichError> {
        if secret.is_empty() {
            return Err(EnrichError::NotConfigured);
        }
        Ok(Self {
            secret_digest: digest(secret),
            inner,
        })
    }

    pub fn authorize(&self, presented: Option<&str>) -> Result<(), EnrichError> {
        match presented {
            Some(token) if !token.is_empty() && digest(token) == self.secret_digest => Ok(()),
            _ => {
                warn!("rejecting enrichment request with missing or invalid token");
                Err(EnrichError::Unauthorized)
            }
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: TextEnrichment> TextEnrichment for BearerGate<E> {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<String, EnrichError> {
        self.authorize(request.token)?;
        self.inner.enrich(request)
    }
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn digest(token: &str) -> Vec<u8> {
    Sha1::digest(token.as_bytes()).to_vec()
}
