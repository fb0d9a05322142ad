//! Credential resolution for the generation API.
//!
//! The OpenAI API key is resolved before any call is attempted: a missing key
//! is a fatal configuration error with remediation guidance, never a deferred
//! first-call failure.

use std::path::PathBuf;

use anyhow::Context;

/// Environment variable holding the OpenAI API key.
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Resolved generation API credentials.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ApiCredentials {
    /// Build credentials from a raw key. Exported for testing.
    #[doc(hidden)]
    pub fn from_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// The bearer token sent to the generation API.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Candidate `.env` locations searched after the process environment.
fn env_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(".env"));
    }
    if let Some(base) = directories::BaseDirs::new() {
        candidates.push(base.home_dir().join(".env"));
    }
    candidates
}

/// Read the API key from a specific `.env` file without mutating the process
/// environment.
fn key_from_env_file(path: &PathBuf) -> Option<String> {
    let iter = dotenvy::from_path_iter(path).ok()?;
    for item in iter {
        let (key, value) = item.ok()?;
        if key == API_KEY_VAR && !value.trim().is_empty() {
            return Some(value);
        }
    }
    None
}

/// Resolve the OpenAI API key.
///
/// Resolution order: process environment, then `.env` in the working
/// directory, then `.env` in the home directory.
///
/// # Errors
///
/// Returns an error describing every searched location and how to fix the
/// configuration when no key is found.
pub fn resolve_api_credentials() -> anyhow::Result<ApiCredentials> {
    if let Ok(key) = std::env::var(API_KEY_VAR) {
        if !key.trim().is_empty() {
            return Ok(ApiCredentials::from_key(key));
        }
    }

    let candidates = env_file_candidates();
    for path in &candidates {
        if !path.exists() {
            continue;
        }
        if let Some(key) = key_from_env_file(path) {
            tracing::debug!(path = %path.display(), "loaded {API_KEY_VAR} from .env file");
            return Ok(ApiCredentials::from_key(key));
        }
    }

    let searched = candidates
        .iter()
        .map(|p| format!("- {} (exists: {})", p.display(), p.exists()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(anyhow::anyhow!(
        "{API_KEY_VAR} not found in environment. Searched locations:\n{searched}\n\n\
         Fix: export {API_KEY_VAR} or add it to a .env file in the working or home directory."
    ))
    .context("missing generation API credentials")
}
