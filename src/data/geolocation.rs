//! IP-based geolocation client
//!
//! Resolves the user's approximate position from their public IP address using
//! the ipapi.co JSON endpoint. Called once per session at startup.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::Location;

/// Default geolocation endpoint
pub const IPAPI_URL: &str = "https://ipapi.co/json/";

/// Errors that can occur when resolving the user's location
#[derive(Debug, Error)]
pub enum GeolocationError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The provider answered without coordinates (rate limited, reserved IP, ...)
    #[error("Provider returned no coordinates: {0}")]
    NoCoordinates(String),
}

/// Client for the geolocation-by-IP service
#[derive(Debug, Clone)]
pub struct GeolocationClient {
    client: Client,
    url: String,
}

impl Default for GeolocationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationClient {
    pub fn new() -> Self {
        Self::with_client(Client::new(), IPAPI_URL)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Look up the caller's location
    pub async fn locate(&self) -> Result<Location, GeolocationError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let text = response.text().await?;
        parse_response(&text)
    }
}

/// ipapi.co payload; only the coordinates are used
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    reason: Option<String>,
}

fn parse_response(text: &str) -> Result<Location, GeolocationError> {
    let body: IpApiResponse = serde_json::from_str(text)?;
    match (body.latitude, body.longitude) {
        (Some(latitude), Some(longitude)) => Ok(Location {
            latitude,
            longitude,
        }),
        _ => Err(GeolocationError::NoCoordinates(
            body.reason.unwrap_or_else(|| "missing latitude/longitude".to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let json = r#"{
            "ip": "203.0.113.7",
            "city": "Paris",
            "country_name": "France",
            "latitude": 48.8566,
            "longitude": 2.3522
        }"#;

        let location = parse_response(json).expect("Should parse location");
        assert!((location.latitude - 48.8566).abs() < 1e-6);
        assert!((location.longitude - 2.3522).abs() < 1e-6);
    }

    #[test]
    fn test_parse_error_payload_reports_reason() {
        let json = r#"{"error": true, "reason": "RateLimited"}"#;

        match parse_response(json) {
            Err(GeolocationError::NoCoordinates(reason)) => assert_eq!(reason, "RateLimited"),
            other => panic!("Expected NoCoordinates, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(
            parse_response("not json"),
            Err(GeolocationError::ParseError(_))
        ));
    }
}
