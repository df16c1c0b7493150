//! Startup checks run before a [`Retriever`](crate::Retriever) is built.
//!
//! Credential sanity and backend connectivity are verified here, once, so
//! that constructing and using the retriever has no network-related failure
//! modes of its own.

use std::time::Duration;

use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Keys shorter than this are treated as truncated or mistyped.
pub const MIN_API_KEY_LENGTH: usize = 20;

/// Fragments that only appear in template or example keys.
const PLACEHOLDER_MARKERS: &[&str] =
    &["your_actual", "your-real", "your_api_key", "your-api-key", "placeholder", "changeme"];

/// Text embedded by [`probe_embedder`].
const PROBE_TEXT: &str = "connectivity check";

/// Reject API keys that are obviously unusable.
///
/// No network call is made; a key that passes may still be refused by the
/// backend, which [`probe_embedder`] detects.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if the key is empty, has surrounding
/// whitespace, contains placeholder text, or is shorter than
/// [`MIN_API_KEY_LENGTH`].
pub fn validate_api_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(RagError::ConfigError("API key is empty".to_string()));
    }
    if key.trim() != key {
        return Err(RagError::ConfigError("API key has surrounding whitespace".to_string()));
    }
    let lowered = key.to_ascii_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lowered.contains(*m)) {
        return Err(RagError::ConfigError(format!("API key contains placeholder text '{marker}'")));
    }
    if key.len() < MIN_API_KEY_LENGTH {
        return Err(RagError::ConfigError(format!(
            "API key is too short ({} characters, expected at least {MIN_API_KEY_LENGTH})",
            key.len()
        )));
    }
    Ok(())
}

/// Embed a probe string and check the result against the provider's declared
/// dimensionality. Returns that dimensionality.
///
/// # Errors
///
/// Returns [`RagError::EmbeddingUnavailable`] if the call fails, times out,
/// or returns a vector of the wrong length.
pub async fn probe_embedder(provider: &dyn EmbeddingProvider, timeout: Duration) -> Result<usize> {
    let embedding = tokio::time::timeout(timeout, provider.embed(PROBE_TEXT))
        .await
        .map_err(|_| {
            RagError::embedding(provider.name(), format!("probe timed out after {timeout:?}"))
        })??;

    let expected = provider.dimensions();
    if embedding.len() != expected {
        warn!(provider = provider.name(), expected, actual = embedding.len(), "probe mismatch");
        return Err(RagError::embedding(
            provider.name(),
            format!("probe returned {} dimensions, provider declares {expected}", embedding.len()),
        ));
    }

    info!(provider = provider.name(), dimensions = expected, "embedding provider reachable");
    Ok(expected)
}
