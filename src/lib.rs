//! Skylark - voice assistant and weather companion CLI
//!
//! This library backs the `skylark` binary:
//! - Audio device enumeration, capture, and playback
//! - Utterance segmentation with ambient-noise calibration
//! - Cloud STT/TTS clients
//! - Chat-completion client
//! - IP geolocation and current-weather lookup with table rendering
//!
//! Each subcommand is a linear pipeline over these pieces; nothing is
//! shared between invocations and nothing persists past process exit.

pub mod assistant;
pub mod audio;
pub mod chat;
pub mod config;
pub mod error;
pub mod geo;
pub mod speech;
pub mod weather;

pub use assistant::Assistant;
pub use chat::{ChatClient, ChatReply};
pub use config::Config;
pub use error::{Error, Result};
pub use geo::Coordinates;
pub use weather::{WeatherClient, WeatherReport};
