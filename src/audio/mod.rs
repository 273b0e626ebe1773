//! Audio input/output
//!
//! Device enumeration, microphone capture, utterance segmentation, and
//! speaker playback. Cloud STT/TTS live in `speech`.

mod capture;
mod devices;
mod playback;
mod segmenter;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use devices::{InputDevice, list_input_devices};
pub use playback::AudioPlayback;
pub use segmenter::{SegmenterState, UtteranceSegmenter};
