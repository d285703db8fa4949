//! The speech-service contract and its cached implementation.

use crate::cache::{CacheEntry, CacheStore};
use crate::error::{Result, VoiceoverError};
use crate::markup::strip_markup;
use crate::options::{CallOverrides, ServiceOptions};
use crate::request::{GenerationRequest, SynthesisConfig};
use crate::voice::{resolve_voice, Voice};
use async_trait::async_trait;
use std::path::Path;
use tracing::{error, info, warn};

/// A text-to-speech backend.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Identifier recorded in every request, e.g. `elevenlabs`.
    fn name(&self) -> &'static str;

    /// Fetch the voices this account can use.
    async fn voices(&self) -> anyhow::Result<Vec<Voice>>;

    /// Synthesize `text` and return the encoded audio.
    async fn synthesize(&self, text: &str, config: &SynthesisConfig) -> anyhow::Result<Vec<u8>>;
}

/// Something that turns narration text into an audio asset.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Produce audio for `text`, reusing a cached asset when one exists.
    ///
    /// `cache_dir` overrides the service's directory and `path` overrides the
    /// key-derived asset name for this call only.
    async fn generate_from_text(
        &self,
        text: &str,
        cache_dir: Option<&Path>,
        path: Option<&str>,
        overrides: &CallOverrides,
    ) -> Result<CacheEntry>;
}

/// [`SpeechService`] backed by a [`SpeechProvider`] and an on-disk cache.
pub struct NarrationService<P> {
    provider: P,
    catalog: Vec<Voice>,
    voice: Voice,
    options: ServiceOptions,
    cache: CacheStore,
}

impl<P: SpeechProvider> NarrationService<P> {
    /// Fetch the provider's catalog and resolve the configured voice.
    pub async fn connect(provider: P, options: ServiceOptions) -> Result<Self> {
        options.validate()?;
        let catalog = provider.voices().await.map_err(|e| {
            error!(provider = provider.name(), error = %e, "failed to list voices");
            VoiceoverError::ProviderUnavailable(format!("{e:#}"))
        })?;
        let voice = resolve_voice(
            &catalog,
            options.voice_name.as_deref(),
            options.voice_id.as_deref(),
        )?
        .into_voice();
        info!(provider = provider.name(), voice = %voice.name, voice_id = %voice.id, "speech service ready");
        let cache = CacheStore::new(options.cache_dir.clone());
        Ok(Self {
            provider,
            catalog,
            voice,
            options,
            cache,
        })
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn catalog(&self) -> &[Voice] {
        &self.catalog
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn transcription_model(&self) -> &str {
        &self.options.transcription_model
    }

    /// Build the normalized request for `text` under `overrides`.
    pub fn request_for(&self, text: &str, overrides: &CallOverrides) -> Result<GenerationRequest> {
        let options = self.options.merge(overrides);
        options.validate()?;
        let voice = self.voice_for(overrides);
        Ok(GenerationRequest::new(
            strip_markup(text),
            self.provider.name(),
            SynthesisConfig::new(voice, &options),
        ))
    }

    // A per-call voice must name a catalog entry; otherwise the service voice stays.
    fn voice_for(&self, overrides: &CallOverrides) -> &Voice {
        let found = match (&overrides.voice_id, &overrides.voice_name) {
            (Some(id), _) => self.catalog.iter().find(|v| &v.id == id),
            (None, Some(name)) => self.catalog.iter().find(|v| &v.name == name),
            (None, None) => return &self.voice,
        };
        found.unwrap_or_else(|| {
            warn!(
                requested_id = ?overrides.voice_id,
                requested_name = ?overrides.voice_name,
                voice = %self.voice.name,
                "per-call voice not found, keeping service voice"
            );
            &self.voice
        })
    }
}

#[async_trait]
impl<P: SpeechProvider> SpeechService for NarrationService<P> {
    async fn generate_from_text(
        &self,
        text: &str,
        cache_dir: Option<&Path>,
        path: Option<&str>,
        overrides: &CallOverrides,
    ) -> Result<CacheEntry> {
        let request = self.request_for(text, overrides)?;
        let cache = match cache_dir {
            Some(dir) => CacheStore::new(dir),
            None => self.cache.clone(),
        };
        let asset = match path {
            Some(path) => path.to_string(),
            None => request.asset_name()?,
        };

        if let Some(entry) = cache.lookup_as(text, &request, &asset)? {
            return Ok(entry);
        }

        info!(
            provider = self.provider.name(),
            voice_id = %request.config.voice_id,
            model = %request.config.model,
            chars = request.input_text.len(),
            "synthesizing speech"
        );
        let audio = self
            .provider
            .synthesize(&request.input_text, &request.config)
            .await
            .map_err(|e| {
                error!(provider = self.provider.name(), error = %e, "speech synthesis failed");
                VoiceoverError::SynthesisFailed(format!("{e:#}"))
            })?;
        cache.store_as(text, &request, &asset, &audio)
    }
}
