//! Voice assistant pipeline
//!
//! One exchange is a straight line: capture an utterance from the
//! microphone, transcribe it, send the transcript to the chat-completion
//! endpoint, synthesize the reply, play it. `run` wraps that in a
//! Ctrl-C-aware loop.

use std::time::Duration;

use crate::audio::{
    AudioCapture, AudioPlayback, SAMPLE_RATE, SegmenterState, UtteranceSegmenter, samples_to_wav,
};
use crate::chat::ChatClient;
use crate::config::{Config, SttProvider};
use crate::speech::{Synthesizer, Transcriber};
use crate::{Error, Result};

/// Window of ambient noise sampled before listening starts
const CALIBRATION_WINDOW: Duration = Duration::from_millis(500);

/// Capture poll cadence
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spoken when the reply payload cannot be understood
const MISUNDERSTOOD_LINE: &str = "Oops! I cannot understand what you said.";

/// Spoken on Ctrl-C before exiting
const FAREWELL_LINE: &str = "Have a nice day!";

/// The voice assistant pipeline
pub struct Assistant {
    transcriber: Transcriber,
    chat: ChatClient,
    synthesizer: Synthesizer,
    playback: AudioPlayback,
    input_device: Option<usize>,
    listen_timeout: Duration,
}

impl Assistant {
    /// Build the pipeline from resolved configuration
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing or the output device
    /// cannot be opened
    pub fn new(config: &Config) -> Result<Self> {
        let voice = &config.voice;

        let stt_key = match voice.stt_provider {
            SttProvider::Whisper => config.openai_key()?,
            SttProvider::Deepgram => config
                .api_keys
                .deepgram
                .as_deref()
                .ok_or_else(|| Error::Config("DEEPGRAM_API_KEY is not set".to_string()))?,
        };

        Ok(Self {
            transcriber: Transcriber::new(
                voice.stt_provider,
                stt_key.to_string(),
                voice.stt_model.clone(),
                voice.stt_language.clone(),
            )?,
            chat: ChatClient::new(
                config.chat.host.clone(),
                config.rapidapi_key()?.to_string(),
                config.chat.model.clone(),
            )?,
            synthesizer: Synthesizer::new(
                config.openai_key()?.to_string(),
                voice.tts_model.clone(),
                voice.tts_voice.clone(),
                voice.tts_speed,
            )?,
            playback: AudioPlayback::with_gain(voice.playback_gain)?,
            input_device: voice.input_device,
            listen_timeout: Duration::from_secs(voice.listen_timeout_secs),
        })
    }

    /// Run the assistant until the exchange (or, with `continuous`, Ctrl-C)
    /// ends it
    ///
    /// # Errors
    ///
    /// Returns error on unrecoverable audio or configuration failures;
    /// per-exchange network hiccups are reported and, in continuous mode,
    /// retried on the next turn.
    #[allow(clippy::future_not_send)] // cpal streams stay on the main thread
    pub async fn run(&self, continuous: bool) -> Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    println!("*--- interrupted ---*");
                    if let Err(e) = self.speak(FAREWELL_LINE).await {
                        tracing::warn!(error = %e, "farewell synthesis failed");
                    }
                    return Ok(());
                }
                result = self.interact_once() => {
                    result?;
                    if !continuous {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Run one listen/transcribe/complete/speak exchange
    #[allow(clippy::future_not_send)]
    async fn interact_once(&self) -> Result<()> {
        let Some(samples) = self.listen().await? else {
            println!("Unable to recognize audio input. Please try again...");
            return Ok(());
        };

        println!("Processing your audio input...");
        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;

        let transcript = match self.transcriber.transcribe(wav).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                println!("Unable to recognize audio input. Please try again...");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                println!("Speech recognition service failed to recognize audio input. Please try again...");
                return Ok(());
            }
        };

        println!("Analyzing your question, please wait... (can take some while)...");
        let reply = match self.chat.ask(&transcript).await {
            Ok(reply) => reply,
            Err(e @ (Error::Chat(_) | Error::Serialization(_))) => {
                // The completion came back but not in a shape we can read
                tracing::warn!(error = %e, "malformed completion payload");
                self.speak(MISUNDERSTOOD_LINE).await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.speak(&reply.message).await
    }

    /// Capture one silence-terminated utterance from the microphone
    ///
    /// Returns None when nothing resembling speech arrives before the
    /// listen timeout.
    #[allow(clippy::future_not_send)]
    async fn listen(&self) -> Result<Option<Vec<f32>>> {
        let mut capture = AudioCapture::open(self.input_device)?;
        let mut segmenter = UtteranceSegmenter::new();

        capture.start()?;

        // Ambient-noise calibration window
        tokio::time::sleep(CALIBRATION_WINDOW).await;
        let ambient = capture.take_buffer();
        segmenter.calibrate(&ambient);

        println!("Listening...");
        let deadline = tokio::time::Instant::now() + self.listen_timeout;

        let utterance = loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let samples = capture.take_buffer();
            if !samples.is_empty() && segmenter.push(&samples) {
                break Some(segmenter.take_utterance());
            }

            if tokio::time::Instant::now() > deadline && segmenter.state() == SegmenterState::Idle {
                tracing::debug!("listen timeout with no speech");
                break None;
            }
        };

        capture.stop();
        Ok(utterance)
    }

    /// Synthesize a line and play it through the speakers
    #[allow(clippy::future_not_send)]
    async fn speak(&self, text: &str) -> Result<()> {
        let mp3 = self.synthesizer.synthesize(text).await?;
        self.playback.play_mp3(&mp3)
    }
}
