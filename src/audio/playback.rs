//! Speaker playback

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate for playback (matches the TTS endpoint's MP3 output)
const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Plays audio through the default output device
pub struct AudioPlayback {
    device: Device,
    config: StreamConfig,
    gain: f32,
}

impl AudioPlayback {
    /// Open the default output device at unity gain
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available
    pub fn new() -> Result<Self> {
        Self::with_gain(1.0)
    }

    /// Open the default output device with a gain factor (0.0 to 1.0)
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available or none supports
    /// 24kHz output
    pub fn with_gain(gain: f32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                (c.channels() == 1 || c.channels() == 2)
                    && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported
            .with_sample_rate(SampleRate(PLAYBACK_SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            channels = config.channels,
            gain,
            "playback device opened"
        );

        Ok(Self {
            device,
            config,
            gain: gain.clamp(0.0, 1.0),
        })
    }

    /// Play mono f32 samples, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if the output stream fails
    pub fn play(&self, samples: &[f32]) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let gain = self.gain;
        let scaled: Arc<Vec<f32>> = Arc::new(samples.iter().map(|s| s * gain).collect());

        let channels = self.config.channels as usize;
        let position = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let cb_samples = Arc::clone(&scaled);
        let cb_position = Arc::clone(&position);
        let cb_finished = Arc::clone(&finished);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let pos = cb_position.load(Ordering::Relaxed);
                        let sample = cb_samples.get(pos).copied().unwrap_or_else(|| {
                            cb_finished.store(true, Ordering::Relaxed);
                            0.0
                        });

                        frame.fill(sample);

                        if pos < cb_samples.len() {
                            cb_position.store(pos + 1, Ordering::Relaxed);
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "playback stream error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        // Poll for completion, bounded by the clip duration plus slack
        let duration_ms = (scaled.len() as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(duration_ms + 500);

        while !finished.load(Ordering::Relaxed) {
            if std::time::Instant::now() > deadline {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        // Let the device drain its last buffer
        std::thread::sleep(std::time::Duration::from_millis(100));
        drop(stream);

        tracing::debug!(samples = scaled.len(), "playback complete");
        Ok(())
    }

    /// Decode MP3 bytes and play them, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub fn play_mp3(&self, mp3_data: &[u8]) -> Result<()> {
        let samples = decode_mp3(mp3_data)?;
        self.play(&samples)
    }
}

/// Decode MP3 bytes to mono f32 samples
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if frame.channels == 2 {
                    // Downmix stereo by averaging channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(samples)
}
