//! Construction-time options and per-call overrides.

use crate::error::{Result, VoiceoverError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";
pub const DEFAULT_CACHE_DIR: &str = "media/voiceovers";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "base";
/// Highest `optimize_streaming_latency` level the provider accepts.
pub const MAX_STREAMING_LATENCY: u8 = 4;

fn default_stability() -> f64 {
    0.5
}

fn default_similarity_boost() -> f64 {
    0.5
}

fn default_speaker_boost() -> bool {
    true
}

/// Voice tuning parameters sent along with a synthesis request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default = "default_stability")]
    pub stability: f64,
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f64,
    #[serde(default)]
    pub style: f64,
    #[serde(default = "default_speaker_boost")]
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            style: 0.0,
            use_speaker_boost: default_speaker_boost(),
        }
    }
}

/// How the provider normalizes numbers, dates and similar tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextNormalization {
    Auto,
    On,
    Off,
}

impl fmt::Display for TextNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::On => "on",
            Self::Off => "off",
        })
    }
}

impl FromStr for TextNormalization {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown text normalization mode `{other}`")),
        }
    }
}

/// Service-level defaults, fixed when a service is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    pub voice_name: Option<String>,
    pub voice_id: Option<String>,
    pub model: String,
    pub voice_settings: Option<VoiceSettings>,
    pub output_format: String,
    pub enable_logging: bool,
    /// Latency hint in the provider's `0..=4` range.
    pub optimize_streaming_latency: Option<u8>,
    pub language_code: Option<String>,
    pub apply_text_normalization: Option<TextNormalization>,
    pub cache_dir: PathBuf,
    pub transcription_model: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            voice_name: None,
            voice_id: None,
            model: DEFAULT_MODEL.into(),
            voice_settings: None,
            output_format: DEFAULT_OUTPUT_FORMAT.into(),
            enable_logging: true,
            optimize_streaming_latency: None,
            language_code: None,
            apply_text_normalization: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            transcription_model: DEFAULT_TRANSCRIPTION_MODEL.into(),
        }
    }
}

impl ServiceOptions {
    pub fn with_voice_name(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }

    pub fn with_voice_id(mut self, id: impl Into<String>) -> Self {
        self.voice_id = Some(id.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = Some(settings);
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = format.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Layer `overrides` on top of these defaults.
    ///
    /// Every field set in `overrides` wins; the rest keep the service value.
    /// `self` is left untouched.
    pub fn merge(&self, overrides: &CallOverrides) -> ServiceOptions {
        ServiceOptions {
            voice_name: overrides.voice_name.clone().or_else(|| self.voice_name.clone()),
            voice_id: overrides.voice_id.clone().or_else(|| self.voice_id.clone()),
            model: overrides.model.clone().unwrap_or_else(|| self.model.clone()),
            voice_settings: overrides.voice_settings.or(self.voice_settings),
            output_format: overrides
                .output_format
                .clone()
                .unwrap_or_else(|| self.output_format.clone()),
            enable_logging: overrides.enable_logging.unwrap_or(self.enable_logging),
            optimize_streaming_latency: overrides
                .optimize_streaming_latency
                .or(self.optimize_streaming_latency),
            language_code: overrides
                .language_code
                .clone()
                .or_else(|| self.language_code.clone()),
            apply_text_normalization: overrides
                .apply_text_normalization
                .or(self.apply_text_normalization),
            cache_dir: self.cache_dir.clone(),
            transcription_model: self.transcription_model.clone(),
        }
    }

    /// Reject values the provider would refuse or that cannot be keyed.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.optimize_streaming_latency {
            if level > MAX_STREAMING_LATENCY {
                return Err(VoiceoverError::InvalidOption(format!(
                    "optimize_streaming_latency must be between 0 and {MAX_STREAMING_LATENCY}, got {level}"
                )));
            }
        }
        if let Some(settings) = &self.voice_settings {
            for (name, value) in [
                ("stability", settings.stability),
                ("similarity_boost", settings.similarity_boost),
                ("style", settings.style),
            ] {
                if !value.is_finite() {
                    return Err(VoiceoverError::InvalidOption(format!(
                        "voice setting {name} must be a finite number, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Options applied to a single `generate_from_text` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOverrides {
    pub voice_name: Option<String>,
    pub voice_id: Option<String>,
    pub model: Option<String>,
    pub voice_settings: Option<VoiceSettings>,
    pub output_format: Option<String>,
    pub enable_logging: Option<bool>,
    pub optimize_streaming_latency: Option<u8>,
    pub language_code: Option<String>,
    pub apply_text_normalization: Option<TextNormalization>,
}

impl CallOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = Some(settings);
        self
    }

    pub fn optimize_streaming_latency(mut self, level: u8) -> Self {
        self.optimize_streaming_latency = Some(level);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn voice_name(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_field_by_field() {
        let base = ServiceOptions::default()
            .with_voice_name("Adam")
            .with_voice_settings(VoiceSettings {
                stability: 0.001,
                similarity_boost: 0.25,
                style: 0.0,
                use_speaker_boost: true,
            });
        let per_call = VoiceSettings {
            stability: 0.5,
            similarity_boost: 0.8,
            style: 0.2,
            use_speaker_boost: false,
        };
        let merged = base.merge(
            &CallOverrides::default()
                .voice_settings(per_call)
                .optimize_streaming_latency(3),
        );

        assert_eq!(merged.voice_settings, Some(per_call));
        assert_eq!(merged.optimize_streaming_latency, Some(3));
        assert_eq!(merged.voice_name.as_deref(), Some("Adam"));
        assert_eq!(merged.model, DEFAULT_MODEL);
        // defaults are not mutated
        assert_eq!(base.voice_settings.unwrap().stability, 0.001);
        assert_eq!(base.optimize_streaming_latency, None);
    }

    #[test]
    fn empty_overrides_keep_defaults() {
        let base = ServiceOptions::default().with_model("eleven_flash_v2_5");
        assert!(CallOverrides::default().is_empty());
        assert_eq!(base.merge(&CallOverrides::default()), base);
    }

    #[test]
    fn partial_settings_take_provider_defaults() {
        let settings: VoiceSettings = serde_json::from_str(r#"{"stability":0.2}"#).unwrap();
        assert_eq!(settings.stability, 0.2);
        assert_eq!(settings.similarity_boost, 0.5);
        assert_eq!(settings.style, 0.0);
        assert!(settings.use_speaker_boost);
    }

    #[test]
    fn parses_normalization_modes() {
        assert_eq!("AUTO".parse::<TextNormalization>(), Ok(TextNormalization::Auto));
        assert_eq!(TextNormalization::Off.to_string(), "off");
        assert!("sometimes".parse::<TextNormalization>().is_err());
    }

    #[test]
    fn validates_latency_and_settings() {
        assert!(ServiceOptions::default().validate().is_ok());

        let mut options = ServiceOptions::default();
        options.optimize_streaming_latency = Some(MAX_STREAMING_LATENCY);
        assert!(options.validate().is_ok());
        options.optimize_streaming_latency = Some(200);
        assert!(matches!(options.validate(), Err(VoiceoverError::InvalidOption(msg)) if msg.contains("200")));

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let options = ServiceOptions::default().with_voice_settings(VoiceSettings {
                style: bad,
                ..VoiceSettings::default()
            });
            assert!(matches!(options.validate(), Err(VoiceoverError::InvalidOption(msg)) if msg.contains("style")));
        }
    }
}
