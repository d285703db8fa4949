//! Voice catalog entries and resolution of a requested voice.

use crate::error::{Result, VoiceoverError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A synthesizable voice as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    #[serde(rename = "voice_id")]
    pub id: String,
    pub name: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Outcome of [`resolve_voice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The requested id or name was found in the catalog.
    Exact(Voice),
    /// Nothing was requested, or the request did not match; the first catalog
    /// entry was chosen instead.
    Fallback(Voice),
}

impl Resolution {
    pub fn voice(&self) -> &Voice {
        match self {
            Self::Exact(v) | Self::Fallback(v) => v,
        }
    }

    pub fn into_voice(self) -> Voice {
        match self {
            Self::Exact(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Pick a voice from `catalog`.
///
/// An `id` is matched before a `name`; neither falls back to the first entry
/// with a warning. An empty catalog is an error.
pub fn resolve_voice(catalog: &[Voice], name: Option<&str>, id: Option<&str>) -> Result<Resolution> {
    let found = match (id, name) {
        (Some(id), _) => catalog.iter().find(|v| v.id == id),
        (None, Some(name)) => catalog.iter().find(|v| v.name == name),
        (None, None) => None,
    };
    if let Some(voice) = found {
        return Ok(Resolution::Exact(voice.clone()));
    }

    let first = catalog.first().ok_or(VoiceoverError::NoVoicesAvailable)?;
    if id.is_none() && name.is_none() {
        warn!(
            voice = %first.name,
            "neither voice name nor voice id provided, using default voice"
        );
    } else {
        warn!(
            requested_id = ?id,
            requested_name = ?name,
            voice = %first.name,
            "requested voice not found, using default voice"
        );
    }
    Ok(Resolution::Fallback(first.clone()))
}
