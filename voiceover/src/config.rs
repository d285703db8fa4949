//! Provider credentials and `.env` bootstrapping.

use crate::error::{Result, VoiceoverError};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Environment variable holding the ElevenLabs API key.
pub const API_KEY_VAR: &str = "ELEVEN_API_KEY";

/// Credentials a provider needs to authenticate.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Load a `.env` file if one is found, then read [`API_KEY_VAR`].
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_var(API_KEY_VAR)
    }

    /// Read the API key from the environment variable `name`.
    ///
    /// Blank values count as missing.
    pub fn from_var(name: &str) -> Result<Self> {
        match std::env::var(name) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(VoiceoverError::MissingCredential {
                vars: vec![name.to_string()],
            }),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Write a `.env` template listing `vars` so the user can fill them in.
///
/// Returns `false` without touching anything if `path` already exists.
pub fn bootstrap_dotenv(path: &Path, vars: &[&str]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body: String = vars.iter().map(|v| format!("{v}=\n")).collect();
    fs::write(path, body)?;
    info!(path = ?path, "created .env template");
    Ok(true)
}
