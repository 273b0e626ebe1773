//! Current-weather lookup via the Meteosource RapidAPI endpoint
//!
//! Fetches current conditions for a coordinate pair, extracts the fixed
//! field set the report cares about, and renders the scalar fields as a
//! table. Nested groups (icon, wind) are extracted but never become table
//! columns.

use comfy_table::Table;

use crate::{Error, Result};

/// Extracted weather report for one coordinate pair
///
/// `latitude`/`longitude` are kept in the provider's string form
/// (e.g. "52.52N") rather than re-parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub latitude: String,
    pub longitude: String,
    pub icon: WeatherIcon,
    pub humidity: f64,
    pub temperature: f64,
    pub visibility: f64,
    pub wind: Wind,
}

/// Icon descriptor for the current conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherIcon {
    pub name: String,
    pub number: u32,
}

/// Wind reading
#[derive(Debug, Clone, PartialEq)]
pub struct Wind {
    /// Speed in the provider's resolved unit system
    pub speed: f64,
    /// Direction in degrees
    pub angle: f64,
    /// Compass direction label (e.g. "NNW")
    pub direction: String,
}

impl WeatherReport {
    /// Render the scalar fields as a single-row table
    ///
    /// Nested groups (icon, wind) carry structure, not a single cell value,
    /// so they are excluded from the columns.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(vec![
            "Latitude",
            "Longitude",
            "Humidity",
            "Temperature",
            "Visibility",
        ]);
        table.add_row(vec![
            self.latitude.clone(),
            self.longitude.clone(),
            format!("{}", self.humidity),
            format!("{}", self.temperature),
            format!("{}", self.visibility),
        ]);
        table
    }
}

/// Queries current conditions from the weather provider
pub struct WeatherClient {
    client: reqwest::Client,
    host: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a new weather client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(host: String, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "RapidAPI key required for weather lookup".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            host,
            api_key,
        })
    }

    /// Fetch current conditions for a coordinate pair
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the provider rejects it, or a
    /// required field is absent from the payload.
    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherReport> {
        let url = format!("https://{}/current", self.host);

        tracing::debug!(latitude, longitude, host = %self.host, "fetching current weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("timezone", "auto".to_string()),
                ("language", "en".to_string()),
                ("units", "auto".to_string()),
            ])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "weather API error");
            return Err(Error::Weather(format!("weather API error {status}: {body}")));
        }

        let body = response.text().await?;
        let report = parse_current(&body)?;
        tracing::info!(
            temperature = report.temperature,
            humidity = report.humidity,
            icon = %report.icon.name,
            wind_dir = %report.wind.direction,
            "weather report ready"
        );

        Ok(report)
    }
}

/// Parse a `current` endpoint payload into a report
///
/// # Errors
///
/// Returns error if the payload is not valid JSON or a required field is
/// absent
pub fn parse_current(body: &str) -> Result<WeatherReport> {
    let envelope: meteosource::CurrentResponse = serde_json::from_str(body)?;
    Ok(WeatherReport::from(envelope))
}

/// Meteosource API response structures
mod meteosource {
    use super::{WeatherIcon, WeatherReport, Wind};
    use serde::Deserialize;

    /// `current` endpoint envelope
    ///
    /// Every field here is required: a payload missing one of them fails
    /// deserialization, which is exactly the "required keys must be
    /// present" contract of the extraction step.
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub lat: String,
        pub lon: String,
        pub current: CurrentConditions,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentConditions {
        pub icon: String,
        pub icon_num: u32,
        pub temperature: f64,
        pub humidity: f64,
        pub visibility: f64,
        pub wind: WindData,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindData {
        pub speed: f64,
        pub angle: f64,
        pub dir: String,
    }

    impl From<CurrentResponse> for WeatherReport {
        fn from(response: CurrentResponse) -> Self {
            let current = response.current;
            Self {
                latitude: response.lat,
                longitude: response.lon,
                icon: WeatherIcon {
                    name: current.icon,
                    number: current.icon_num,
                },
                humidity: current.humidity,
                temperature: current.temperature,
                visibility: current.visibility,
                wind: Wind {
                    speed: current.wind.speed,
                    angle: current.wind.angle,
                    direction: current.wind.dir,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "lat": "52.52N",
        "lon": "13.405E",
        "elevation": 34,
        "timezone": "Europe/Berlin",
        "units": "metric",
        "current": {
            "icon": "partly_sunny",
            "icon_num": 4,
            "summary": "Partly sunny",
            "temperature": 21.5,
            "wind": {"speed": 2.3, "angle": 330, "dir": "NNW", "gusts": 4.1},
            "precipitation": {"total": 0.0, "type": "none"},
            "cloud_cover": 35,
            "humidity": 60,
            "visibility": 24.1
        }
    }"#;

    #[test]
    fn extracts_fixed_field_set() {
        let envelope: meteosource::CurrentResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = WeatherReport::from(envelope);

        assert_eq!(report.latitude, "52.52N");
        assert_eq!(report.icon.name, "partly_sunny");
        assert_eq!(report.icon.number, 4);
        assert!((report.temperature - 21.5).abs() < f64::EPSILON);
        assert_eq!(report.wind.direction, "NNW");
    }

    #[test]
    fn missing_required_key_fails_extraction() {
        // Drop "humidity" from the payload
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value["current"].as_object_mut().unwrap().remove("humidity");

        let result: std::result::Result<meteosource::CurrentResponse, _> =
            serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn table_excludes_nested_groups() {
        let envelope: meteosource::CurrentResponse = serde_json::from_str(SAMPLE).unwrap();
        let report = WeatherReport::from(envelope);

        let rendered = report.to_table().to_string();
        assert!(rendered.contains("Latitude"));
        assert!(rendered.contains("Temperature"));
        assert!(rendered.contains("21.5"));
        // Nested groups never become columns
        assert!(!rendered.contains("Icon"));
        assert!(!rendered.contains("Wind"));
        assert!(!rendered.contains("NNW"));
    }
}
