//! Caller-IP geolocation
//!
//! Resolves the machine's public IP to coordinates so the weather lookup can
//! run with no arguments. Uses the keyless `ip-api.com` JSON endpoint.

use serde::Deserialize;

use crate::{Error, Result};

const GEOLOCATION_URL: &str = "http://ip-api.com/json/";

/// Latitude/longitude pair with optional place labels
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// City name, when the provider reports one
    pub city: Option<String>,
    /// Country name, when the provider reports one
    pub country: Option<String>,
}

/// Response envelope from `ip-api.com`
///
/// The provider signals failure in-band: `status` is "success" or "fail",
/// and `lat`/`lon` are absent on failure.
#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl TryFrom<GeolocationResponse> for Coordinates {
    type Error = Error;

    fn try_from(response: GeolocationResponse) -> Result<Self> {
        if response.status != "success" {
            let reason = response.message.unwrap_or_else(|| "unknown".to_string());
            return Err(Error::Geolocation(format!("provider reported failure: {reason}")));
        }

        match (response.lat, response.lon) {
            (Some(latitude), Some(longitude)) => Ok(Self {
                latitude,
                longitude,
                city: response.city,
                country: response.country,
            }),
            _ => Err(Error::Geolocation(
                "provider response is missing coordinates".to_string(),
            )),
        }
    }
}

/// Resolve the caller's current location from its public IP
///
/// # Errors
///
/// Returns error if the request fails or the provider reports failure.
pub async fn locate(client: &reqwest::Client) -> Result<Coordinates> {
    tracing::debug!(url = GEOLOCATION_URL, "resolving current location");

    let response: GeolocationResponse = client
        .get(GEOLOCATION_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let coordinates = Coordinates::try_from(response)?;
    tracing::debug!(
        latitude = coordinates.latitude,
        longitude = coordinates.longitude,
        city = coordinates.city.as_deref().unwrap_or("?"),
        "location resolved"
    );

    Ok(coordinates)
}
