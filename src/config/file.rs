//! TOML configuration file loading
//!
//! Supports `~/.config/skylark/config.toml` as a persistent config source.
//! Every field is optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct SkylarkConfigFile {
    /// Chat completion configuration
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Weather lookup configuration
    #[serde(default)]
    pub weather: WeatherFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogFileConfig,
}

/// Chat completion configuration
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// Model identifier (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    /// RapidAPI host serving the chat-completions endpoint
    pub host: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: Option<String>,

    /// Language hint passed to the STT provider (e.g. "en")
    pub stt_language: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,

    /// Playback gain (0.0 to 1.0)
    pub playback_gain: Option<f32>,

    /// Input device index; omit to use the system default
    pub input_device: Option<usize>,

    /// Seconds to wait for an utterance before giving up
    pub listen_timeout_secs: Option<u64>,
}

/// Weather lookup configuration
#[derive(Debug, Default, Deserialize)]
pub struct WeatherFileConfig {
    /// RapidAPI host serving the weather endpoint
    pub host: Option<String>,

    /// Path the weather command writes its failure message to
    pub error_file: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub rapidapi: Option<String>,
    pub openai: Option<String>,
    pub deepgram: Option<String>,
}

/// Logging configuration
#[derive(Debug, Default, Deserialize)]
pub struct LogFileConfig {
    /// Flat file to mirror diagnostics into
    pub file: Option<PathBuf>,
}

/// Load the TOML config file from the standard path
///
/// Returns `SkylarkConfigFile::default()` if the file doesn't exist or can't
/// be parsed. A parse failure is logged but never fatal; env vars and flags
/// still apply.
#[must_use]
pub fn load() -> SkylarkConfigFile {
    config_file_path().map_or_else(SkylarkConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from an explicit path
#[must_use]
pub fn load_from(path: &Path) -> SkylarkConfigFile {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return SkylarkConfigFile::default();
    };

    match toml::from_str(&contents) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid config file, ignoring");
            SkylarkConfigFile::default()
        }
    }
}

/// Standard config file location (`~/.config/skylark/config.toml`)
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "skylark", "skylark")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_leaves_other_sections_default() {
        let file: SkylarkConfigFile = toml::from_str(
            r#"
            [voice]
            tts_voice = "nova"
            tts_speed = 1.25
            "#,
        )
        .unwrap();

        assert_eq!(file.voice.tts_voice.as_deref(), Some("nova"));
        assert_eq!(file.voice.tts_speed, Some(1.25));
        assert!(file.api_keys.rapidapi.is_none());
        assert!(file.weather.host.is_none());
    }

    #[test]
    fn empty_file_parses() {
        let file: SkylarkConfigFile = toml::from_str("").unwrap();
        assert!(file.chat.model.is_none());
        assert!(file.log.file.is_none());
    }
}
