//! Configuration management for skylark
//!
//! Resolution order: built-in defaults, then the optional TOML config file,
//! then environment variables (a `.env` in the working directory is loaded
//! before this module runs).

pub mod file;

use std::path::PathBuf;

use crate::{Error, Result};

/// Default RapidAPI host for the weather endpoint
const DEFAULT_WEATHER_HOST: &str = "ai-weather-by-meteosource.p.rapidapi.com";

/// Default RapidAPI host for the chat-completions endpoint
const DEFAULT_CHAT_HOST: &str = "openai80.p.rapidapi.com";

/// Resolved skylark configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat completion settings
    pub chat: ChatConfig,

    /// Voice pipeline settings
    pub voice: VoiceConfig,

    /// Weather lookup settings
    pub weather: WeatherConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Chat completion settings
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Model identifier sent with each request
    pub model: String,

    /// RapidAPI host serving `/chat/completions`
    pub host: String,
}

/// Voice pipeline settings
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT provider backend
    pub stt_provider: SttProvider,

    /// STT model identifier
    pub stt_model: String,

    /// Language hint for transcription (None = provider default)
    pub stt_language: Option<String>,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// Playback gain (0.0 to 1.0)
    pub playback_gain: f32,

    /// Input device index; None = system default
    pub input_device: Option<usize>,

    /// Seconds to wait for an utterance before giving up
    pub listen_timeout_secs: u64,
}

/// Supported STT backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttProvider {
    Whisper,
    Deepgram,
}

impl std::str::FromStr for SttProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

/// Weather lookup settings
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// RapidAPI host serving `/current`
    pub host: String,

    /// Path the weather command writes its failure message to
    pub error_file: PathBuf,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// RapidAPI key (weather and chat endpoints)
    pub rapidapi: Option<String>,

    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Deepgram API key (optional STT backend)
    pub deepgram: Option<String>,
}

impl Config {
    /// Load configuration from the standard file path and environment
    ///
    /// # Errors
    ///
    /// Returns error if an override value fails to parse (e.g. a
    /// non-numeric device index or an unknown STT provider).
    pub fn load() -> Result<Self> {
        Self::from_file(file::load())
    }

    /// Resolve a loaded config file against environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if an override value fails to parse.
    pub fn from_file(fc: file::SkylarkConfigFile) -> Result<Self> {
        let stt_provider = env_or("SKYLARK_STT_PROVIDER", fc.voice.stt_provider)
            .map_or(Ok(SttProvider::Whisper), |s| s.parse())?;

        let input_device = match env_or("SKYLARK_INPUT_DEVICE", None) {
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                Error::Config(format!("SKYLARK_INPUT_DEVICE is not a number: {raw}"))
            })?),
            None => fc.voice.input_device,
        };

        let tts_speed = match env_or("SKYLARK_TTS_SPEED", None) {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| Error::Config(format!("SKYLARK_TTS_SPEED is not a number: {raw}")))?,
            None => fc.voice.tts_speed.unwrap_or(1.0),
        };

        if !(0.25..=4.0).contains(&tts_speed) {
            return Err(Error::Config(format!(
                "tts_speed must be between 0.25 and 4.0, got {tts_speed}"
            )));
        }

        let playback_gain = fc.voice.playback_gain.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&playback_gain) {
            return Err(Error::Config(format!(
                "playback_gain must be between 0.0 and 1.0, got {playback_gain}"
            )));
        }

        Ok(Self {
            chat: ChatConfig {
                model: env_or("SKYLARK_CHAT_MODEL", fc.chat.model)
                    .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
                host: env_or("RAPIDAPI_CHAT_HOST", fc.chat.host)
                    .unwrap_or_else(|| DEFAULT_CHAT_HOST.to_string()),
            },
            voice: VoiceConfig {
                stt_provider,
                stt_model: env_or("SKYLARK_STT_MODEL", fc.voice.stt_model).unwrap_or_else(|| {
                    match stt_provider {
                        SttProvider::Whisper => "whisper-1".to_string(),
                        SttProvider::Deepgram => "nova-2".to_string(),
                    }
                }),
                stt_language: env_or("SKYLARK_STT_LANGUAGE", fc.voice.stt_language),
                tts_model: env_or("SKYLARK_TTS_MODEL", fc.voice.tts_model)
                    .unwrap_or_else(|| "tts-1".to_string()),
                tts_voice: env_or("SKYLARK_TTS_VOICE", fc.voice.tts_voice)
                    .unwrap_or_else(|| "alloy".to_string()),
                tts_speed,
                playback_gain,
                input_device,
                listen_timeout_secs: fc.voice.listen_timeout_secs.unwrap_or(10),
            },
            weather: WeatherConfig {
                host: env_or("RAPIDAPI_WEATHER_HOST", fc.weather.host)
                    .unwrap_or_else(|| DEFAULT_WEATHER_HOST.to_string()),
                error_file: env_or("SKYLARK_ERROR_FILE", fc.weather.error_file)
                    .map_or_else(|| PathBuf::from("error.txt"), PathBuf::from),
            },
            api_keys: ApiKeys {
                rapidapi: env_or("RAPIDAPI_KEY", fc.api_keys.rapidapi),
                openai: env_or("OPENAI_API_KEY", fc.api_keys.openai),
                deepgram: env_or("DEEPGRAM_API_KEY", fc.api_keys.deepgram),
            },
        })
    }

    /// RapidAPI key, or a config error naming the variable
    ///
    /// # Errors
    ///
    /// Returns error if the key is unset.
    pub fn rapidapi_key(&self) -> Result<&str> {
        self.api_keys
            .rapidapi
            .as_deref()
            .ok_or_else(|| Error::Config("RAPIDAPI_KEY is not set".to_string()))
    }

    /// `OpenAI` API key, or a config error naming the variable
    ///
    /// # Errors
    ///
    /// Returns error if the key is unset.
    pub fn openai_key(&self) -> Result<&str> {
        self.api_keys
            .openai
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))
    }
}

/// Environment variable override with file-value fallback
fn env_or(var: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).or(fallback)
}
