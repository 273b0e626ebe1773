use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skylark::audio::{AudioPlayback, list_input_devices};
use skylark::speech::Synthesizer;
use skylark::{Assistant, Config, WeatherClient, geo};

/// Skylark - voice assistant and weather companion
#[derive(Parser)]
#[command(name = "skylark", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mirror diagnostics into a flat log file
    #[arg(long, env = "SKYLARK_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List audio input devices
    Devices,
    /// Look up current weather for your location (or explicit coordinates)
    Weather {
        /// Latitude; skips IP geolocation when given with --lon
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude; skips IP geolocation when given with --lat
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Listen for a question and speak the model's answer
    Assistant {
        /// Keep the conversation going until Ctrl-C
        #[arg(long)]
        continuous: bool,
    },
    /// Speak a single line of text
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A local .env supplies API keys during development
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,skylark=info",
        1 => "info,skylark=debug",
        2 => "debug",
        _ => "trace",
    };

    // The config file can also name a log file; the flag/env wins
    let file_config = skylark::config::file::load();
    let log_file = cli.log_file.clone().or_else(|| file_config.log.file.clone());

    if let Err(e) = init_logging(filter, log_file.as_deref()) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli, file_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Set up the tracing subscriber, optionally duplicated to a flat file
fn init_logging(filter: &str, log_file: Option<&std::path::Path>) -> anyhow::Result<()> {
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(filter))
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(filter))
                .init();
        }
    }
    Ok(())
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli, file_config: skylark::config::file::SkylarkConfigFile) -> anyhow::Result<()> {
    let config = Config::from_file(file_config)?;

    match cli.command {
        Command::Devices => cmd_devices(),
        Command::Weather { lat, lon } => cmd_weather(&config, lat.zip(lon)).await,
        Command::Assistant { continuous } => cmd_assistant(&config, continuous).await,
        Command::Say { text } => cmd_say(&config, &text).await,
    }
}

/// List audio input devices
fn cmd_devices() -> anyhow::Result<()> {
    let devices = list_input_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }

    for device in devices {
        let marker = if device.is_default { " (default)" } else { "" };
        println!("Device index {}: {}{}", device.index, device.name, marker);
    }

    Ok(())
}

/// Look up and print current weather
async fn cmd_weather(config: &Config, coordinates: Option<(f64, f64)>) -> anyhow::Result<()> {
    println!("Here is your current weather data...");

    match weather_report(config, coordinates).await {
        Ok(table) => {
            println!("{table}");
            Ok(())
        }
        Err(e) => {
            // Mirror the failure into the error file before bailing
            let error_file = &config.weather.error_file;
            if let Err(write_err) = std::fs::write(error_file, e.to_string()) {
                tracing::warn!(
                    path = %error_file.display(),
                    error = %write_err,
                    "could not write error file"
                );
            }
            println!("Something went wrong...!");
            Err(e.into())
        }
    }
}

/// Resolve coordinates, fetch conditions, and render the table
async fn weather_report(
    config: &Config,
    coordinates: Option<(f64, f64)>,
) -> skylark::Result<comfy_table::Table> {
    let http = reqwest::Client::new();

    let (latitude, longitude) = match coordinates {
        Some(pair) => pair,
        None => {
            let location = geo::locate(&http).await?;
            (location.latitude, location.longitude)
        }
    };

    let client = WeatherClient::new(
        config.weather.host.clone(),
        config.rapidapi_key()?.to_string(),
    )?;
    let report = client.current(latitude, longitude).await?;

    Ok(report.to_table())
}

/// Run the voice assistant
#[allow(clippy::future_not_send)]
async fn cmd_assistant(config: &Config, continuous: bool) -> anyhow::Result<()> {
    let assistant = Assistant::new(config)?;
    assistant.run(continuous).await?;
    Ok(())
}

/// Speak a single line of text
#[allow(clippy::future_not_send)]
async fn cmd_say(config: &Config, text: &str) -> anyhow::Result<()> {
    let voice = &config.voice;
    let synthesizer = Synthesizer::new(
        config.openai_key()?.to_string(),
        voice.tts_model.clone(),
        voice.tts_voice.clone(),
        voice.tts_speed,
    )?;
    let playback = AudioPlayback::with_gain(voice.playback_gain)?;

    let mp3 = synthesizer.synthesize(text).await?;
    playback.play_mp3(&mp3)?;

    Ok(())
}
