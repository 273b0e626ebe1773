//! Cloud speech services
//!
//! Transcription (speech-to-text) and synthesis (text-to-speech) over the
//! providers' HTTPS APIs. Audio capture/playback live in `audio`.

mod stt;
mod tts;

pub use stt::Transcriber;
pub use tts::Synthesizer;
