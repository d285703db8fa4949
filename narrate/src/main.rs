use anyhow::{anyhow, Context};
use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::info;
use voiceover::options::{DEFAULT_CACHE_DIR, DEFAULT_MODEL, DEFAULT_OUTPUT_FORMAT};
use voiceover::{
    bootstrap_dotenv, init_logging, CallOverrides, Credentials, ElevenLabsProvider,
    ElevenLabsService, ServiceOptions, SpeechService, TextNormalization, VoiceSettings,
    VoiceoverError,
};

/// Narrate lines of text with ElevenLabs, caching every clip.
///
/// Each result record is printed to stdout as one JSON line.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Lines to narrate. Read from --file or stdin when omitted.
    lines: Vec<String>,
    /// File with one line of narration per line
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, env = "VOICEOVER_VOICE_NAME")]
    voice_name: Option<String>,
    #[arg(long, env = "VOICEOVER_VOICE_ID")]
    voice_id: Option<String>,
    #[arg(long, env = "VOICEOVER_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
    #[arg(long, env = "VOICEOVER_OUTPUT_FORMAT", default_value = DEFAULT_OUTPUT_FORMAT)]
    output_format: String,
    #[arg(long, env = "VOICEOVER_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,
    #[arg(long)]
    stability: Option<f64>,
    #[arg(long)]
    similarity_boost: Option<f64>,
    #[arg(long)]
    style: Option<f64>,
    #[arg(long)]
    no_speaker_boost: bool,
    /// Ask the provider not to keep request history
    #[arg(long)]
    no_logging: bool,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=4))]
    optimize_streaming_latency: Option<u8>,
    #[arg(long)]
    language_code: Option<String>,
    /// auto, on or off
    #[arg(long)]
    text_normalization: Option<String>,
    /// Override the API base URL
    #[arg(long, env = "ELEVENLABS_BASE_URL")]
    base_url: Option<String>,
    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn voice_settings(&self) -> Option<VoiceSettings> {
        if self.stability.is_none()
            && self.similarity_boost.is_none()
            && self.style.is_none()
            && !self.no_speaker_boost
        {
            return None;
        }
        let defaults = VoiceSettings::default();
        Some(VoiceSettings {
            stability: self.stability.unwrap_or(defaults.stability),
            similarity_boost: self.similarity_boost.unwrap_or(defaults.similarity_boost),
            style: self.style.unwrap_or(defaults.style),
            use_speaker_boost: !self.no_speaker_boost,
        })
    }

    fn options(&self) -> anyhow::Result<ServiceOptions> {
        let apply_text_normalization = self
            .text_normalization
            .as_deref()
            .map(|s| s.parse::<TextNormalization>().map_err(|e| anyhow!(e)))
            .transpose()?;
        Ok(ServiceOptions {
            voice_name: self.voice_name.clone(),
            voice_id: self.voice_id.clone(),
            model: self.model.clone(),
            voice_settings: self.voice_settings(),
            output_format: self.output_format.clone(),
            enable_logging: !self.no_logging,
            optimize_streaming_latency: self.optimize_streaming_latency,
            language_code: self.language_code.clone(),
            apply_text_normalization,
            cache_dir: self.cache_dir.clone(),
            ..ServiceOptions::default()
        })
    }

    fn read_lines(&self) -> anyhow::Result<Vec<String>> {
        let raw = if !self.lines.is_empty() {
            self.lines.clone()
        } else if let Some(path) = &self.file {
            std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            std::io::stdin()
                .lock()
                .lines()
                .collect::<std::io::Result<Vec<String>>>()?
        };
        Ok(raw
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect())
    }
}

fn credentials_or_bootstrap() -> anyhow::Result<Credentials> {
    match Credentials::from_env() {
        Ok(credentials) => Ok(credentials),
        Err(VoiceoverError::MissingCredential { vars }) => {
            let names: Vec<&str> = vars.iter().map(String::as_str).collect();
            if bootstrap_dotenv(Path::new(".env"), &names)? {
                eprintln!(
                    "Created .env listing {}. Add your ElevenLabs API key there and run narrate again.",
                    vars.join(", ")
                );
            } else {
                eprintln!(
                    "{} is not set. Add it to the environment or to .env and run narrate again.",
                    vars.join(", ")
                );
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads the VOICEOVER_* fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let options = cli.options()?;
    let lines = cli.read_lines()?;
    let credentials = credentials_or_bootstrap()?;

    let mut provider = ElevenLabsProvider::new(credentials);
    if let Some(url) = &cli.base_url {
        provider = provider.with_base_url(url.clone());
    }
    let service = ElevenLabsService::connect(provider, options).await?;

    let overrides = CallOverrides::default();
    for line in &lines {
        let entry = service
            .generate_from_text(line, None, None, &overrides)
            .await?;
        info!(audio = %entry.absolute_path().display(), "narrated");
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}
