//! Utterance segmentation
//!
//! Turns a raw capture stream into one spoken phrase: calibrate a speech
//! threshold against ambient noise, wait for energy above it, then cut the
//! segment once sustained silence follows the speech.

/// Floor for the speech threshold, used when calibration measures a very
/// quiet room
const BASE_THRESHOLD: f32 = 0.015;

/// Calibrated threshold = ambient RMS times this factor
const CALIBRATION_HEADROOM: f32 = 2.5;

/// Minimum accumulated speech to accept a segment (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends an utterance (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

/// State of the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    /// Waiting for speech
    Idle,
    /// Accumulating an utterance
    Capturing,
}

/// Segments a sample stream into silence-terminated utterances
pub struct UtteranceSegmenter {
    threshold: f32,
    state: SegmenterState,
    buffer: Vec<f32>,
    silence_run: usize,
}

impl Default for UtteranceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl UtteranceSegmenter {
    /// Create a segmenter with the uncalibrated base threshold
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold: BASE_THRESHOLD,
            state: SegmenterState::Idle,
            buffer: Vec::new(),
            silence_run: 0,
        }
    }

    /// Set the speech threshold from an ambient-noise sample window
    ///
    /// The threshold lands above the measured room noise but never below
    /// the base floor.
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let ambient_rms = rms(ambient);
        self.threshold = (ambient_rms * CALIBRATION_HEADROOM).max(BASE_THRESHOLD);

        tracing::debug!(
            ambient_rms,
            threshold = self.threshold,
            "segmenter calibrated"
        );
    }

    /// Feed captured samples; returns true once an utterance is complete
    ///
    /// After a completed utterance, collect it with
    /// [`UtteranceSegmenter::take_utterance`].
    pub fn push(&mut self, samples: &[f32]) -> bool {
        let is_speech = rms(samples) > self.threshold;

        match self.state {
            SegmenterState::Idle => {
                if is_speech {
                    self.state = SegmenterState::Capturing;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence_run = 0;
                    tracing::trace!("speech started");
                }
                false
            }
            SegmenterState::Capturing => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_run = 0;
                } else {
                    self.silence_run += samples.len();
                }

                if self.silence_run > SILENCE_SAMPLES {
                    if self.buffer.len() - self.silence_run > MIN_SPEECH_SAMPLES {
                        tracing::debug!(samples = self.buffer.len(), "utterance complete");
                        return true;
                    }

                    // A blip too short to be speech; go back to waiting
                    tracing::trace!("discarding short segment");
                    self.reset();
                }

                false
            }
        }
    }

    /// Take the accumulated utterance and return to idle
    pub fn take_utterance(&mut self) -> Vec<f32> {
        self.state = SegmenterState::Idle;
        self.silence_run = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Reset to idle, dropping any partial segment
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.buffer.clear();
        self.silence_run = 0;
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SegmenterState {
        self.state
    }

    /// Current speech threshold
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Samples accumulated so far
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// RMS energy of a sample window
#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert!(rms(&vec![0.0f32; 256]) < 0.001);
        assert!(rms(&[]) < 0.001);
    }

    #[test]
    fn rms_of_constant_signal() {
        let level = rms(&vec![0.5f32; 256]);
        assert!((level - 0.5).abs() < 0.01);
    }

    #[test]
    fn calibration_raises_threshold_above_ambient() {
        let mut segmenter = UtteranceSegmenter::new();
        let noisy_room = vec![0.05f32; 1024];

        segmenter.calibrate(&noisy_room);

        assert!(segmenter.threshold() > 0.05);
        // Ambient-level audio must not trigger capture
        assert!(!segmenter.push(&noisy_room));
        assert_eq!(segmenter.state(), SegmenterState::Idle);
    }

    #[test]
    fn calibration_keeps_floor_in_quiet_room() {
        let mut segmenter = UtteranceSegmenter::new();
        segmenter.calibrate(&vec![0.0001f32; 1024]);
        assert!((segmenter.threshold() - BASE_THRESHOLD).abs() < f32::EPSILON);
    }
}
