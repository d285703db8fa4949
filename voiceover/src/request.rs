//! Normalized generation requests and their cache keys.

use crate::error::Result;
use crate::options::{ServiceOptions, TextNormalization, VoiceSettings};
use crate::voice::Voice;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Provider-facing parameters of a single synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    pub model: String,
    pub voice_id: String,
    pub voice_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
    pub output_format: String,
    pub enable_logging: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimize_streaming_latency: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_text_normalization: Option<TextNormalization>,
}

impl SynthesisConfig {
    pub fn new(voice: &Voice, options: &ServiceOptions) -> Self {
        Self {
            model: options.model.clone(),
            voice_id: voice.id.clone(),
            voice_name: voice.name.clone(),
            voice_settings: options.voice_settings,
            output_format: options.output_format.clone(),
            enable_logging: options.enable_logging,
            optimize_streaming_latency: options.optimize_streaming_latency,
            language_code: options.language_code.clone(),
            apply_text_normalization: options.apply_text_normalization,
        }
    }

    /// File extension of the audio the provider returns for this output format.
    pub fn file_extension(&self) -> &'static str {
        file_extension(&self.output_format)
    }
}

/// Everything that determines the audio produced for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Text with markup removed, exactly as sent to the provider.
    pub input_text: String,
    pub service: String,
    pub config: SynthesisConfig,
}

impl GenerationRequest {
    pub fn new(input_text: impl Into<String>, service: impl Into<String>, config: SynthesisConfig) -> Self {
        Self {
            input_text: input_text.into(),
            service: service.into(),
            config,
        }
    }

    /// Sorted-key JSON encoding of the request.
    pub fn canonical_json(&self) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(canonical_json(&value))
    }

    /// Hex SHA-256 of [`Self::canonical_json`].
    pub fn cache_key(&self) -> Result<String> {
        let digest = Sha256::digest(self.canonical_json()?.as_bytes());
        Ok(hex::encode(digest))
    }

    /// Default asset file name: cache key plus the native extension.
    pub fn asset_name(&self) -> Result<String> {
        Ok(format!("{}.{}", self.cache_key()?, self.config.file_extension()))
    }
}

/// Encode `value` as compact JSON with every object's keys sorted.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Map a provider output format such as `mp3_44100_128` to a file extension.
pub fn file_extension(output_format: &str) -> &'static str {
    match output_format.split('_').next().unwrap_or_default() {
        "pcm" => "pcm",
        "ulaw" => "ulaw",
        "alaw" => "alaw",
        "opus" => "opus",
        "wav" => "wav",
        _ => "mp3",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        let voice = Voice::new("v1", "Adam");
        let options = ServiceOptions::default().with_voice_settings(VoiceSettings::default());
        GenerationRequest::new("Hello world", "elevenlabs", SynthesisConfig::new(&voice, &options))
    }

    #[test]
    fn key_ignores_field_order() {
        let a = r#"{"input_text":"hi","service":"elevenlabs","config":{"model":"m","voice_id":"v1","voice_name":"Adam","output_format":"mp3_44100_128","enable_logging":true,"voice_settings":{"stability":0.5,"similarity_boost":0.5,"style":0.0,"use_speaker_boost":true}}}"#;
        let b = r#"{"config":{"voice_settings":{"use_speaker_boost":true,"style":0.0,"similarity_boost":0.5,"stability":0.5},"enable_logging":true,"output_format":"mp3_44100_128","voice_name":"Adam","voice_id":"v1","model":"m"},"service":"elevenlabs","input_text":"hi"}"#;
        let a: GenerationRequest = serde_json::from_str(a).unwrap();
        let b: GenerationRequest = serde_json::from_str(b).unwrap();
        assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());
    }

    #[test]
    fn canonical_json_sorts_nested_keys() {
        let v: Value = serde_json::from_str(r#"{"b":{"z":1,"a":[{"y":2,"x":1}]},"a":"s"}"#).unwrap();
        assert_eq!(canonical_json(&v), r#"{"a":"s","b":{"a":[{"x":1,"y":2}],"z":1}}"#);
    }

    #[test]
    fn key_tracks_every_setting() {
        let base = request();
        let mut other = base.clone();
        other.config.voice_settings = Some(VoiceSettings {
            style: 0.2,
            ..VoiceSettings::default()
        });
        assert_ne!(base.cache_key().unwrap(), other.cache_key().unwrap());

        let mut other = base.clone();
        other.config.optimize_streaming_latency = Some(1);
        assert_ne!(base.cache_key().unwrap(), other.cache_key().unwrap());

        assert_eq!(base.cache_key().unwrap(), request().cache_key().unwrap());
        assert_eq!(base.cache_key().unwrap().len(), 64);
    }

    #[test]
    fn asset_name_uses_native_extension() {
        let mut req = request();
        assert!(req.asset_name().unwrap().ends_with(".mp3"));
        req.config.output_format = "pcm_16000".into();
        assert!(req.asset_name().unwrap().ends_with(".pcm"));
        assert_eq!(file_extension("ulaw_8000"), "ulaw");
        assert_eq!(file_extension("opus_48000_64"), "opus");
        assert_eq!(file_extension("something"), "mp3");
    }

    #[test]
    fn key_is_the_digest_of_the_sorted_encoding() {
        let req = request();
        let json = req.canonical_json().unwrap();
        assert!(json.starts_with(r#"{"config":{"enable_logging":true,"model":"#));
        assert_eq!(req.cache_key().unwrap(), hex::encode(Sha256::digest(json.as_bytes())));
    }
}
