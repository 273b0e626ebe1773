//! Audio pipeline integration tests
//!
//! Exercises segmentation and WAV encoding without audio hardware

use std::io::Cursor;

use skylark::audio::{SAMPLE_RATE, SegmenterState, UtteranceSegmenter, samples_to_wav};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[test]
fn segmenter_starts_idle() {
    let segmenter = UtteranceSegmenter::new();
    assert_eq!(segmenter.state(), SegmenterState::Idle);
    assert_eq!(segmenter.buffered(), 0);
}

#[test]
fn silence_does_not_trigger_capture() {
    let mut segmenter = UtteranceSegmenter::new();

    let silence = generate_silence(0.5);
    assert!(!segmenter.push(&silence));
    assert_eq!(segmenter.state(), SegmenterState::Idle);
    assert_eq!(segmenter.buffered(), 0);
}

#[test]
fn speech_then_silence_completes_an_utterance() {
    let mut segmenter = UtteranceSegmenter::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert!(!segmenter.push(&speech));
    assert_eq!(segmenter.state(), SegmenterState::Capturing);

    let silence = generate_silence(0.6);
    assert!(segmenter.push(&silence));

    let utterance = segmenter.take_utterance();
    assert_eq!(utterance.len(), speech.len() + silence.len());
    assert_eq!(segmenter.state(), SegmenterState::Idle);
    assert_eq!(segmenter.buffered(), 0);
}

#[test]
fn short_blip_is_discarded() {
    let mut segmenter = UtteranceSegmenter::new();

    // 0.1s of sound is below the minimum speech length
    let blip = generate_sine_samples(440.0, 0.1, 0.3);
    segmenter.push(&blip);
    assert_eq!(segmenter.state(), SegmenterState::Capturing);

    let silence = generate_silence(0.6);
    assert!(!segmenter.push(&silence));
    assert_eq!(segmenter.state(), SegmenterState::Idle);
}

#[test]
fn utterance_accumulates_across_pushes() {
    let mut segmenter = UtteranceSegmenter::new();

    let chunk1 = generate_sine_samples(440.0, 0.2, 0.3);
    let chunk2 = generate_sine_samples(440.0, 0.2, 0.3);
    segmenter.push(&chunk1);
    segmenter.push(&chunk2);

    assert_eq!(segmenter.buffered(), chunk1.len() + chunk2.len());
}

#[test]
fn reset_returns_to_idle() {
    let mut segmenter = UtteranceSegmenter::new();

    segmenter.push(&generate_sine_samples(440.0, 0.3, 0.3));
    assert_eq!(segmenter.state(), SegmenterState::Capturing);

    segmenter.reset();
    assert_eq!(segmenter.state(), SegmenterState::Idle);
    assert_eq!(segmenter.buffered(), 0);
}

#[test]
fn calibrated_segmenter_ignores_room_noise() {
    let mut segmenter = UtteranceSegmenter::new();

    // A noisy room that would trip the uncalibrated threshold
    let room_noise = generate_sine_samples(120.0, 0.5, 0.05);
    segmenter.calibrate(&room_noise);

    assert!(!segmenter.push(&room_noise));
    assert_eq!(segmenter.state(), SegmenterState::Idle);

    // Speech well above the noise floor still triggers
    let speech = generate_sine_samples(440.0, 0.5, 0.4);
    segmenter.push(&speech);
    assert_eq!(segmenter.state(), SegmenterState::Capturing);
}

#[test]
fn wav_encoding_produces_riff_header() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");
    assert!(wav_data.len() > 44); // header is 44 bytes
}

#[test]
fn wav_roundtrip_preserves_sample_count() {
    let original: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original.len());
}
