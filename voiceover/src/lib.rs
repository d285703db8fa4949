//! Narrate scenes with synthesized speech.
//!
//! A [`SpeechService`] turns text into an audio asset. [`NarrationService`]
//! implements it on top of any [`SpeechProvider`], resolving the requested
//! voice once at construction and caching every result in a flat,
//! content-addressed directory so re-running a script never pays for the
//! same synthesis twice. [`ElevenLabsProvider`] is the bundled backend.

pub mod cache;
pub mod config;
pub mod elevenlabs;
pub mod error;
pub mod logging;
pub mod markup;
pub mod options;
pub mod request;
pub mod service;
pub mod voice;

pub use cache::{CacheEntry, CacheStore};
pub use config::{bootstrap_dotenv, Credentials, API_KEY_VAR};
pub use elevenlabs::{ElevenLabsProvider, ElevenLabsService};
pub use error::{Result, VoiceoverError};
pub use logging::init_logging;
pub use markup::{bookmarks, strip_markup};
pub use options::{CallOverrides, ServiceOptions, TextNormalization, VoiceSettings};
pub use request::{GenerationRequest, SynthesisConfig};
pub use service::{NarrationService, SpeechProvider, SpeechService};
pub use voice::{resolve_voice, Resolution, Voice};
