//! Speech-to-text transcription

use crate::config::SttProvider;
use crate::{Error, Result};

const WHISPER_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEEPGRAM_URL: &str = "https://api.deepgram.com/v1/listen";

/// Response from the Whisper transcription endpoint
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from the Deepgram transcription endpoint
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// Transcribes WAV audio via a cloud STT provider
pub struct Transcriber {
    client: reqwest::Client,
    provider: SttProvider,
    api_key: String,
    model: String,
    language: Option<String>,
}

impl Transcriber {
    /// Create a transcriber for the configured provider
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn new(
        provider: SttProvider,
        api_key: String,
        model: String,
        language: Option<String>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            let which = match provider {
                SttProvider::Whisper => "OpenAI",
                SttProvider::Deepgram => "Deepgram",
            };
            return Err(Error::Config(format!("{which} API key required for STT")));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            provider,
            api_key,
            model,
            language,
        })
    }

    /// Transcribe WAV audio bytes to text
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider rejects it
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String> {
        tracing::debug!(
            provider = ?self.provider,
            audio_bytes = wav.len(),
            "starting transcription"
        );

        let transcript = match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(wav).await?,
            SttProvider::Deepgram => self.transcribe_deepgram(wav).await?,
        };

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }

    async fn transcribe_whisper(&self, wav: Vec<u8>) -> Result<String> {
        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(wav)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(WHISPER_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}: {body}")));
        }

        let parsed: WhisperResponse = response.json().await?;
        Ok(parsed.text.trim().to_string())
    }

    async fn transcribe_deepgram(&self, wav: Vec<u8>) -> Result<String> {
        let mut query = vec![("model", self.model.clone()), ("punctuate", "true".to_string())];
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }

        let response = self
            .client
            .post(DEEPGRAM_URL)
            .query(&query)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "audio/wav")
            .body(wav)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(Error::Stt(format!("Deepgram API error {status}: {body}")));
        }

        let parsed: DeepgramResponse = response.json().await?;
        let transcript = parsed
            .results
            .channels
            .first()
            .and_then(|channel| channel.alternatives.first())
            .map(|alternative| alternative.transcript.trim().to_string())
            .unwrap_or_default();

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_rejected() {
        let result = Transcriber::new(
            SttProvider::Whisper,
            String::new(),
            "whisper-1".to_string(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn deepgram_transcript_path() {
        let parsed: DeepgramResponse = serde_json::from_str(
            r#"{"results":{"channels":[{"alternatives":[{"transcript":"hello world"}]}]}}"#,
        )
        .unwrap();

        let transcript = parsed
            .results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
            .map(|a| a.transcript.clone())
            .unwrap_or_default();

        assert_eq!(transcript, "hello world");
    }

    #[test]
    fn deepgram_empty_channels_yield_empty_transcript() {
        let parsed: DeepgramResponse =
            serde_json::from_str(r#"{"results":{"channels":[]}}"#).unwrap();

        assert!(parsed.results.channels.first().is_none());
    }
}
