//! ElevenLabs text-to-speech backend.

use crate::config::Credentials;
use crate::error::Result;
use crate::options::{ServiceOptions, TextNormalization, VoiceSettings};
use crate::request::SynthesisConfig;
use crate::service::{NarrationService, SpeechProvider};
use crate::voice::Voice;
use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const XI_API_KEY_HEADER: &str = "xi-api-key";

/// HTTP client for the ElevenLabs API.
#[derive(Clone)]
pub struct ElevenLabsProvider {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl ElevenLabsProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
            credentials,
        }
    }

    /// Target another server, e.g. a mock in tests.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid ElevenLabs url `{}{}`", self.base_url, path))
    }
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<Voice>,
}

#[derive(Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<&'a VoiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apply_text_normalization: Option<TextNormalization>,
}

/// Pull the human-readable message out of an error response.
///
/// ElevenLabs reports `{"detail": {"status": .., "message": ..}}` or
/// `{"detail": "..."}`; anything else is returned verbatim.
fn error_message(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());
    match detail {
        Some(Value::String(s)) => s,
        Some(Value::Object(map)) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => Value::Object(map.clone()).to_string(),
        },
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

async fn check(resp: Response) -> anyhow::Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.text().await {
        Ok(body) if body.trim().is_empty() => "empty response body".to_string(),
        Ok(body) => error_message(&body),
        Err(e) => format!("unreadable response body: {e}"),
    };
    bail!("ElevenLabs returned {status}: {message}")
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
        let url = self.url("/v1/voices")?;
        debug!(%url, "listing voices");
        let resp = self
            .client
            .get(url)
            .header(XI_API_KEY_HEADER, self.credentials.api_key())
            .send()
            .await?;
        let listing: VoicesResponse = check(resp).await?.json().await?;
        Ok(listing.voices)
    }

    async fn synthesize(&self, text: &str, config: &SynthesisConfig) -> anyhow::Result<Vec<u8>> {
        let mut url = self.url(&format!("/v1/text-to-speech/{}", config.voice_id))?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("output_format", &config.output_format);
            qp.append_pair("enable_logging", if config.enable_logging { "true" } else { "false" });
            if let Some(level) = config.optimize_streaming_latency {
                qp.append_pair("optimize_streaming_latency", &level.to_string());
            }
        }
        let body = TextToSpeechBody {
            text,
            model_id: &config.model,
            voice_settings: config.voice_settings.as_ref(),
            language_code: config.language_code.as_deref(),
            apply_text_normalization: config.apply_text_normalization,
        };
        info!(%url, "requesting TTS");
        let resp = self
            .client
            .post(url)
            .header(XI_API_KEY_HEADER, self.credentials.api_key())
            .json(&body)
            .send()
            .await?;
        let bytes = check(resp).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Narration service speaking through ElevenLabs.
pub type ElevenLabsService = NarrationService<ElevenLabsProvider>;

impl NarrationService<ElevenLabsProvider> {
    /// Read credentials from the environment and connect to ElevenLabs.
    pub async fn from_env(options: ServiceOptions) -> Result<Self> {
        let credentials = Credentials::from_env()?;
        Self::connect(ElevenLabsProvider::new(credentials), options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_structured_detail() {
        let body = r#"{"detail":{"status":"quota_exceeded","message":"This request exceeds your quota."}}"#;
        assert_eq!(error_message(body), "This request exceeds your quota.");
    }

    #[test]
    fn extracts_string_detail_and_raw_bodies() {
        assert_eq!(error_message(r#"{"detail":"Not Found"}"#), "Not Found");
        assert_eq!(error_message("upstream timeout\n"), "upstream timeout");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let p = ElevenLabsProvider::new(Credentials::new("k")).with_base_url("http://localhost:9/");
        assert_eq!(p.base_url(), "http://localhost:9");
        assert_eq!(p.url("/v1/voices").unwrap().as_str(), "http://localhost:9/v1/voices");
    }
}
